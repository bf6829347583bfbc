/*!
 * Bounded retries with exponential backoff.
 *
 * The waiting itself goes through a [`Sleeper`] so that tests can observe the
 * requested delays without actually waiting for them.
 */

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationConfig;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each later one
    pub base_delay_ms: u64,
    /// No retry waits less than this
    pub floor_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 3000,
            floor_ms: 3000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, floor_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            floor_ms,
        }
    }

    /// Policy from the `translation` config section
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.retry_count, config.retry_backoff_ms, config.retry_floor_ms)
    }

    /// Attempts actually made; zero still means one try
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait before retrying after failed attempt `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let backoff_ms = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(backoff_ms.max(self.floor_ms))
    }
}

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that records every requested delay and returns immediately
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// The error of the last attempt is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.effective_attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "Attempt {}/{} failed: {} - retrying in {}ms",
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!("Giving up after {} attempts: {}", max_attempts, e);
                return Err(e);
            }
        }
    }
}
