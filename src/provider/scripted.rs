//! In-process provider answering from a script, for tests and local runs.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{GenerationRequest, GenerationResponse, GenerativeProvider, ProviderError};

/// Answers from a queue of canned results; once the queue is empty every
/// call gets `otherwise`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<GenerationResponse, ProviderError>>>,
    otherwise: Result<GenerationResponse, ProviderError>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
    delay: Duration,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            otherwise: Err(ProviderError::with_status(500, "script exhausted")),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn then(self, result: Result<GenerationResponse, ProviderError>) -> Self {
        locked(&self.script).push_back(result);
        self
    }

    pub fn otherwise(mut self, result: Result<GenerationResponse, ProviderError>) -> Self {
        self.otherwise = result;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        locked(&self.requests).clone()
    }
}

impl GenerativeProvider for ScriptedProvider {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        locked(&self.requests).push(request);
        let next = locked(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());
        let delay = self.delay;

        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            next
        }
    }
}
