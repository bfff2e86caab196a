pub mod config;
pub mod error;
pub mod resilience;
pub mod telemetry;
pub mod workflows;
