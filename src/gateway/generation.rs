//! Generation tokens for discarding late results.
//!
//! Each request in a view scope (a chat conversation, say) starts a new
//! generation. When a slow call finishes after a newer request began in the
//! same scope, its result is stale and gets dropped.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    scope: String,
    value: u64,
}

impl Generation {
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

#[derive(Debug, Default)]
pub struct GenerationTracker {
    current: DashMap<String, u64>,
    // Shared across scopes so a token never repeats after end_scope.
    next: AtomicU64,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation in `scope`, superseding any earlier one.
    pub fn begin(&self, scope: &str) -> Generation {
        let value = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.insert(scope.to_string(), value);
        Generation {
            scope: scope.to_string(),
            value,
        }
    }

    pub fn is_current(&self, generation: &Generation) -> bool {
        self.current
            .get(&generation.scope)
            .map(|v| *v == generation.value)
            .unwrap_or(false)
    }

    /// Settle `generation` once its result is in. Returns whether it was still
    /// current; if so the scope is dropped, so finished scopes are not retained.
    pub fn finish(&self, generation: &Generation) -> bool {
        self.current
            .remove_if(&generation.scope, |_, v| *v == generation.value)
            .is_some()
    }

    /// Forget a scope when its view goes away; outstanding generations become stale.
    pub fn end_scope(&self, scope: &str) {
        self.current.remove(scope);
    }

    /// Number of scopes with a generation in flight.
    pub fn in_flight(&self) -> usize {
        self.current.len()
    }
}
