//! Per-feature call coalescing.
//!
//! At most one remote call per feature is in flight. A caller that finds the
//! lock held does not wait; it degrades to cached or fallback data.

use dashmap::DashSet;

use crate::gateway::types::FeatureKey;

#[derive(Debug, Default)]
pub struct CallLocks {
    held: DashSet<FeatureKey>,
}

impl CallLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `feature`, or `None` if another call holds it.
    pub fn try_acquire(&self, feature: FeatureKey) -> Option<CallGuard<'_>> {
        // insert is the atomic test-and-set
        if self.held.insert(feature) {
            Some(CallGuard {
                locks: self,
                feature,
            })
        } else {
            None
        }
    }

    pub fn is_held(&self, feature: FeatureKey) -> bool {
        self.held.contains(&feature)
    }
}

/// Releases the feature lock when dropped, on every exit path.
#[derive(Debug)]
pub struct CallGuard<'a> {
    locks: &'a CallLocks,
    feature: FeatureKey,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.locks.held.remove(&self.feature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_caller_wins() {
        let locks = CallLocks::new();
        let guard = locks.try_acquire(FeatureKey::FeedSummary);
        assert!(guard.is_some());
        assert!(locks.try_acquire(FeatureKey::FeedSummary).is_none());
        // Features are independent
        assert!(locks.try_acquire(FeatureKey::GlobalEchoes).is_some());

        drop(guard);
        assert!(!locks.is_held(FeatureKey::FeedSummary));
        assert!(locks.try_acquire(FeatureKey::FeedSummary).is_some());
    }

    #[test]
    fn test_released_on_panic() {
        let locks = CallLocks::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = locks.try_acquire(FeatureKey::GlobalEchoes);
            panic!("remote call blew up");
        }));
        assert!(result.is_err());
        assert!(!locks.is_held(FeatureKey::GlobalEchoes));
    }
}
