// Domain layer - Plain data types and state transitions
pub mod dashboard;
pub mod infra;
pub mod telemetry;
