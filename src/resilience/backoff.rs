//! Exponential backoff with jitter for confirmation polling.

use rand::Rng;
use std::time::Duration;

use crate::config::schema::PollingConfig;

/// Calculate exponential backoff delay with jitter.
///
/// `attempt` 0 is the first poll, which waits `base_ms`. Each further
/// attempt doubles the delay until `max_ms`; up to 10% jitter is added on top.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential_base = 2u64.saturating_pow(attempt);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Polling schedule derived from [`PollingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBackoff {
    pub initial: Duration,
    pub max: Duration,
    pub timeout: Duration,
}

impl PollBackoff {
    /// Delay before poll number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial.as_millis() as u64,
            self.max.as_millis() as u64,
        )
    }
}

impl From<&PollingConfig> for PollBackoff {
    fn from(config: &PollingConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.initial_interval_ms),
            max: Duration::from_millis(config.max_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}
