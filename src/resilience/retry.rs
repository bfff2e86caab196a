use std::thread;
use std::time::Duration;

/// Bounded retry with exponential backoff, doubling between `min_backoff`
/// and `max_backoff`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempts: u32,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            min_backoff,
            max_backoff: max_backoff.max(min_backoff),
        }
    }

    /// Policy for tests and callers that must not sleep.
    pub fn immediate(attempts: u32) -> Self {
        Self::new(attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `operation` until it succeeds or the attempt budget is spent,
    /// returning the last error.
    pub fn run<T, E, F>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let mut backoff = self.min_backoff;
        let mut last_err = None;

        for attempt in 1..=self.attempts {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    last_err = Some(err);
                    if attempt < self.attempts && !backoff.is_zero() {
                        thread::sleep(backoff);
                        backoff = (backoff * 2).min(self.max_backoff);
                    }
                }
            }
        }

        Err(last_err.expect("at least one attempt runs"))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(8))
    }
}
