//! Persisted per-owner story collections with TTL pruning and a hard cap.

use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::Clock;
use crate::config::StoryConfig;
use crate::observability::metrics;
use crate::storage::{read_json, write_json, KvStore, STORIES_KEY_PREFIX};
use crate::stories::types::{StoryAuthor, StoryDraft, StoryEntry, StoryError};

pub fn stories_key(owner: &str) -> String {
    format!("{}:{}", STORIES_KEY_PREFIX, owner)
}

/// Per-owner locks serializing read-modify-write of a story collection.
#[derive(Default)]
struct OwnerLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OwnerLocks {
    fn lock(&self, owner: &str) -> OwnerGuard<'_> {
        let mutex = self
            .locks
            .entry(owner.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        OwnerGuard {
            locks: self,
            owner: owner.to_string(),
            mutex,
        }
    }
}

/// Holds the owner's lock for its lifetime; the map entry is dropped once
/// no other caller references it.
struct OwnerGuard<'a> {
    locks: &'a OwnerLocks,
    owner: String,
    mutex: Arc<Mutex<()>>,
}

impl OwnerGuard<'_> {
    fn hold(&self) -> MutexGuard<'_, ()> {
        self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        // Only our own entry, referenced by the map and by us
        self.locks.locks.remove_if(&self.owner, |_, m| {
            Arc::ptr_eq(m, &self.mutex) && Arc::strong_count(m) <= 2
        });
    }
}

#[derive(Clone)]
pub struct EphemeralStore {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: StoryConfig,
    owners: Arc<OwnerLocks>,
}

impl EphemeralStore {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: StoryConfig) -> Self {
        Self {
            store,
            clock,
            config,
            owners: Arc::new(OwnerLocks::default()),
        }
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    /// Unexpired stories of `owner`, oldest first. Expired entries are
    /// removed from storage as a side effect.
    pub fn load_active(&self, owner: &str) -> Vec<StoryEntry> {
        let guard = self.owners.lock(owner);
        let _held = guard.hold();
        self.load_active_locked(owner)
    }

    fn load_active_locked(&self, owner: &str) -> Vec<StoryEntry> {
        let key = stories_key(owner);
        let stored: Vec<StoryEntry> = read_json(self.store.as_ref(), &key).unwrap_or_default();
        let stored_count = stored.len();
        let now = self.clock.now_ms();

        let mut active: Vec<StoryEntry> = stored
            .into_iter()
            .filter(|s| now.saturating_sub(s.created_at) < self.config.ttl_ms)
            .collect();
        active.sort_by_key(StoryEntry::order_key);

        if active.len() != stored_count {
            let pruned = stored_count - active.len();
            tracing::debug!(owner, pruned, "Pruned expired stories");
            metrics::record_stories_removed("expired", pruned);
            if let Err(e) = write_json(self.store.as_ref(), &key, &active) {
                tracing::warn!(owner, error = %e, "Failed to rewrite pruned stories");
            }
        }

        active
    }

    /// Persist a batch of drafts as new stories. Returns the new entries that
    /// survived the cap.
    pub fn append_batch(
        &self,
        owner: &str,
        author: &StoryAuthor,
        drafts: Vec<StoryDraft>,
    ) -> Result<Vec<StoryEntry>, StoryError> {
        if owner.trim().is_empty() {
            return Err(StoryError::EmptyOwner);
        }
        if author.author_name.trim().is_empty() {
            return Err(StoryError::EmptyAuthor);
        }

        let drafts: Vec<StoryDraft> = drafts.into_iter().filter(|d| !d.is_empty()).collect();
        if drafts.is_empty() {
            return Err(StoryError::NothingToPost);
        }

        let now = self.clock.now_ms();
        let created: Vec<StoryEntry> = drafts
            .into_iter()
            .enumerate()
            .map(|(rank, draft)| StoryEntry {
                id: uuid::Uuid::new_v4().to_string(),
                owner_id: owner.to_string(),
                author_name: author.author_name.clone(),
                author_avatar: author.author_avatar.clone(),
                text: Some(draft.text).filter(|t| !t.trim().is_empty()),
                image: draft.image,
                created_at: now,
                rank: rank as u32,
                display_duration_ms: self.config.display_duration_ms,
            })
            .collect();

        let guard = self.owners.lock(owner);
        let _held = guard.hold();

        let mut all = self.load_active_locked(owner);
        all.extend(created.iter().cloned());
        all.sort_by_key(StoryEntry::order_key);
        let mut evicted = 0;
        if all.len() > self.config.max_total {
            evicted = all.len() - self.config.max_total;
            all.drain(..evicted);
            tracing::debug!(owner, evicted, "Evicted oldest stories over the cap");
        }

        write_json(self.store.as_ref(), &stories_key(owner), &all)?;

        let survivors: Vec<StoryEntry> = created
            .into_iter()
            .filter(|c| all.iter().any(|s| s.id == c.id))
            .collect();
        metrics::record_stories_appended(survivors.len());
        if evicted > 0 {
            metrics::record_stories_removed("evicted", evicted);
        }
        Ok(survivors)
    }
}
