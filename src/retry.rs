use std::{thread, time::Duration};

use crate::error::Result;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 300;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Bounded retry with a fixed pause, applied to transient catalog failures only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Runs `op` until it succeeds, fails permanently, or the attempts are used up.
    /// The last failure is returned in the latter two cases.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(val) => return Ok(val),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    log::warn!(
                        "{} failed at try {:03}/{}: {}",
                        what,
                        attempt,
                        self.max_attempts,
                        err
                    );
                    attempt += 1;
                    thread::sleep(self.backoff);
                }
                Err(err) => {
                    log::error!("{} failed after {} tries: {}", what, attempt, err);
                    return Err(err);
                }
            }
        }
    }
}
