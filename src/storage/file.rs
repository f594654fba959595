//! JSON-file backed store.
//!
//! The whole map is held in memory and rewritten on every mutation so the
//! breaker deadline and story collections survive a restart.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::storage::{KvStore, StorageError};

#[derive(Clone)]
pub struct FileStore {
    inner: Arc<DashMap<String, String>>,
    path: PathBuf,
    // Serializes file rewrites; the map itself is concurrent.
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    ///
    /// An unreadable or malformed file is logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let inner = DashMap::new();

        if path.exists() {
            match Self::read_file(&path) {
                Ok(map) => {
                    for (k, v) in map {
                        inner.insert(k, v);
                    }
                    tracing::info!(path = ?path, entries = inner.len(), "Loaded key-value store");
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Ignoring unreadable store file");
                }
            }
        }

        Self {
            inner: Arc::new(inner),
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn read_file(path: &Path) -> Result<HashMap<String, String>, StorageError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn flush(&self) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        // Write to a sibling file and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.inner.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
