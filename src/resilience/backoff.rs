//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before retrying after `attempt` (0-based), without jitter: `base * 2^attempt`.
pub fn base_delay_ms(attempt: u32, base_ms: u64) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(attempt))
}

/// Calculate exponential backoff delay with jitter uniform in `[0, jitter_ms)`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, jitter_ms: u64) -> Duration {
    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..jitter_ms)
    } else {
        0
    };

    Duration::from_millis(base_delay_ms(attempt, base_ms).saturating_add(jitter))
}
