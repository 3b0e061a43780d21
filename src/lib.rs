/// floodrisk_service: flood risk scoring service for the sensor network.
///
/// # Module structure
///
/// ```text
/// floodrisk_service
/// ├── model       — shared data types (readings, risk bands, error enums)
/// ├── config      — service configuration loader (floodrisk.toml)
/// ├── sensors     — water-level sensor location registry
/// ├── align       — hourly left-join of sensor and weather series
/// ├── store       — feature store: imputation means + fallback queries
/// ├── classifier
/// │   ├── tree    — single CART classification tree
/// │   └── forest  — bootstrap-aggregated random forest
/// ├── service     — risk scoring: per-sensor jitter, bands, history window
/// ├── endpoint    — JSON HTTP API (/api/risk, /api/risk-history, /health)
/// └── ingest
///     ├── readings — CSV parsers for sensor/weather/merged exports
///     ├── nws      — api.weather.gov hourly forecast client
///     └── fixtures (test only) — representative CSV and API payloads
/// ```

/// Public modules
pub mod align;
pub mod classifier;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod sensors;
pub mod service;
pub mod store;
