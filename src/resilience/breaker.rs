use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Breaker position in the Closed -> Open -> HalfOpen cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failures: u32,
    open_until: Option<Instant>,
}

/// Circuit breaker guarding one external dependency.
///
/// Opens after `threshold` consecutive failures and stays open for `cooldown`.
/// Once the cooldown elapses a single probe call is allowed (`HalfOpen`);
/// its success closes the breaker, its failure re-opens it and resets the
/// cooldown. Instances are created per dependency and passed in explicitly;
/// the inner mutex makes them safe to share across concurrent runs.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            cooldown,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failures: 0,
                open_until: None,
            }),
        }
    }

    /// Whether a call may be attempted right now.
    ///
    /// An `Open` breaker whose cooldown has elapsed transitions to `HalfOpen`
    /// and admits exactly one probe.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            BreakerState::Open => {
                let resume = inner.open_until;
                if resume.is_some_and(|at| Instant::now() >= at) {
                    inner.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
            BreakerState::Closed | BreakerState::HalfOpen => true,
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        inner.state = BreakerState::Closed;
        inner.failures = 0;
        inner.open_until = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        if inner.state == BreakerState::HalfOpen {
            // Failed probe: straight back to Open with a fresh cooldown.
            inner.state = BreakerState::Open;
            inner.open_until = Some(Instant::now() + self.cooldown);
            inner.failures = self.threshold;
            return;
        }

        inner.failures += 1;
        if inner.failures >= self.threshold {
            inner.state = BreakerState::Open;
            inner.open_until = Some(Instant::now() + self.cooldown);
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().expect("breaker mutex poisoned").state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.allow());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_probe_success_closes() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(20));
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.allow());

        thread::sleep(Duration::from_millis(30));
        assert!(breaker.allow());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_probe_failure_reopens_with_fresh_cooldown() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(20));
        breaker.record_failure();
        thread::sleep(Duration::from_millis(30));
        assert!(breaker.allow());

        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.allow());
    }
}
