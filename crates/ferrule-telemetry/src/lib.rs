//! Observability for Ferrule.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: request counters and latency histograms via the `metrics`
//!   facade, exported by whatever recorder the host installs
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ferrule_requests_total` | Counter | `handler`, `status` | Total request count |
//! | `ferrule_request_duration_seconds` | Histogram | `handler` | Request latency |
//! | `ferrule_route_misses_total` | Counter | `method` | Requests with no route |
//! | `ferrule_halts_total` | Counter | `middleware` | Requests halted by middleware |
//! | `ferrule_in_flight_requests` | Gauge | - | Currently processing requests |
//!
//! # Example
//!
//! ```rust,ignore
//! use ferrule_telemetry::{init_logging, metrics, LogConfig};
//!
//! fn main() -> Result<(), ferrule_telemetry::TelemetryError> {
//!     init_logging(&LogConfig::production().with_service_name("orders"))?;
//!     metrics::describe_metrics();
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig};
pub use metrics::{describe_metrics, record_halt, record_request, record_route_miss, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
