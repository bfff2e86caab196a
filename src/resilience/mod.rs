mod breaker;
mod retry;

pub use breaker::{BreakerState, CircuitBreaker};
pub use retry::RetryPolicy;
