//! Retry logic.
//!
//! # Responsibilities
//! - Refuse to call while the circuit breaker is open
//! - Classify provider failures as rate limiting or not
//! - Retry rate-limited calls with exponential backoff + jitter
//! - Trip the breaker when the retry budget runs out
//!
//! # Design Decisions
//! - Only rate limiting is retried; every other failure returns at once
//! - The retry budget is chosen per call site, the timing constants are not
//! - Backoff sleeps run to completion; callers discard stale results instead

use std::future::Future;
use tokio::time::sleep;

use crate::config::ResilienceConfig;
use crate::gateway::types::GatewayError;
use crate::provider::ProviderError;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::circuit_breaker::CircuitBreaker;

/// Determine if an error means the provider is rate limiting us.
pub fn is_rate_limit(error: &ProviderError) -> bool {
    error.status == Some(429)
        || error.code == Some(429)
        || error.message.contains("429")
        || error.message.contains("RESOURCE_EXHAUSTED")
}

/// Wraps single remote calls with the breaker check and rate-limit retries.
#[derive(Clone, Debug)]
pub struct RetryingInvoker {
    breaker: CircuitBreaker,
    policy: ResilienceConfig,
}

impl RetryingInvoker {
    pub fn new(breaker: CircuitBreaker, policy: ResilienceConfig) -> Self {
        Self { breaker, policy }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn policy(&self) -> &ResilienceConfig {
        &self.policy
    }

    /// Run `operation` up to `max_retries + 1` times.
    pub async fn invoke<F, Fut, T>(&self, max_retries: u32, mut operation: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        if self.breaker.is_open() {
            return Err(GatewayError::Cooldown {
                remaining_ms: self.breaker.remaining().as_millis() as u64,
            });
        }

        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        tracing::debug!(attempts = attempt + 1, "Generative call succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !is_rate_limit(&error) {
                        tracing::debug!(error = %error, "Non-retryable provider error");
                        return Err(GatewayError::Provider(error));
                    }

                    if attempt >= max_retries {
                        self.breaker.trip(self.policy.lockout());
                        tracing::debug!(
                            max_retries,
                            lockout_ms = self.policy.lockout_ms,
                            "Rate limit retries exhausted, circuit opened"
                        );
                        return Err(GatewayError::RateLimited(error));
                    }

                    let delay = calculate_backoff(attempt, self.policy.base_delay_ms, self.policy.jitter_ms);
                    tracing::debug!(attempt, delay = ?delay, "Rate limited, backing off");
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
