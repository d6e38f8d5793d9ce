//! Retry policy applied by the coordinator to transport failures.

use std::time::Duration;

/// How often a host is re-queried after a transport failure, and how long to
/// wait in between.
///
/// A host is attempted at most `1 + max_retries` times. Protocol errors are
/// never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Retry {
    pub max_retries: u32,
    pub backoff: Backoff,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Backoff {
    #[default]
    None,
    Fixed {
        delay: Duration,
    },
    /// Delay doubles after each attempt, starting at `initial` and capped at `max`.
    Exponential {
        initial: Duration,
        max: Duration,
    },
}

impl Default for Retry {
    /// One retry, exponential backoff from 250ms capped at 2s.
    fn default() -> Self {
        Self::exponential(1, Duration::from_millis(250), Duration::from_secs(2))
    }
}

impl Retry {
    /// A single attempt per host.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::None,
        }
    }

    /// `max_retries` retries, each after the same `delay`.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// `max_retries` retries, starting at `initial` and doubling up to `max`.
    pub fn exponential(max_retries: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential { initial, max },
        }
    }

    /// Total attempts per host, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (0 for the first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        match &self.backoff {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay } => *delay,
            Backoff::Exponential { initial, max } => {
                let multiplier = 1u32.checked_shl(retry.min(31)).unwrap_or(u32::MAX);
                initial.saturating_mul(multiplier).min(*max)
            }
        }
    }
}
