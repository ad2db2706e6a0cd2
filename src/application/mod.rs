// Application layer - Use cases and the ports they depend on
pub mod dashboard_service;
pub mod query_planner;
pub mod series_renderer;
pub mod telemetry_api;
