//! Bounded retry with linearly growing waits for remote operations.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::backoff::retry_delay;
use crate::error::{EngineError, RemoteError};
use crate::io::notifier::{Notifier, RunStatus, notify_or_log};

/// Attempt budget and delay unit for one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

/// Blocking wait between attempts. Tests substitute a recorder.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread, suspending the whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Wraps one remote operation at a time; keeps no state between calls.
pub struct RetryExecutor<'a, N, S> {
    policy: RetryPolicy,
    notifier: &'a N,
    sleeper: &'a S,
}

impl<'a, N: Notifier, S: Sleeper> RetryExecutor<'a, N, S> {
    pub fn new(policy: RetryPolicy, notifier: &'a N, sleeper: &'a S) -> Self {
        Self {
            policy,
            notifier,
            sleeper,
        }
    }

    /// Run `op` up to `max_attempts` times, waiting `k * base_delay` before
    /// retry `k`. When every attempt fails, the notifier is told and
    /// [`EngineError::Unrecoverable`] carries the last error.
    pub fn execute<T, F>(&self, operation: &str, mut op: F) -> Result<T, EngineError>
    where
        F: FnMut() -> Result<T, RemoteError>,
    {
        let attempts = self.policy.max_attempts.max(1);
        let mut last = None;
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "recovered after retry");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if attempt < attempts {
                        let delay = retry_delay(self.policy.base_delay, attempt);
                        warn!(
                            operation,
                            attempt,
                            ?delay,
                            error = %err,
                            "retrying after error"
                        );
                        self.sleeper.sleep(delay);
                    }
                    last = Some(err);
                }
            }
        }

        let last = last.unwrap_or_else(|| RemoteError::Network("no attempt made".to_string()));
        let err = EngineError::Unrecoverable {
            operation: operation.to_string(),
            attempts,
            last,
        };
        notify_or_log(
            self.notifier,
            RunStatus::Failure,
            &format!("The script has stopped due to an unrecoverable error :\n{err}"),
        );
        Err(err)
    }
}
