//! Request metrics for Ferrule.
//!
//! Metrics go through the `metrics` facade. No exporter is installed here;
//! whichever recorder the host process installs receives them, and without
//! one every call is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ferrule_requests_total` | Counter | `handler`, `status` | Total requests |
//! | `ferrule_request_duration_seconds` | Histogram | `handler` | Request latency |
//! | `ferrule_route_misses_total` | Counter | `method` | Requests with no matching route |
//! | `ferrule_halts_total` | Counter | `middleware` | Requests halted by middleware |
//! | `ferrule_in_flight_requests` | Gauge | - | In-flight requests |

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Counter of dispatched requests.
pub const REQUESTS_TOTAL: &str = "ferrule_requests_total";
/// Histogram of request durations.
pub const REQUEST_DURATION_SECONDS: &str = "ferrule_request_duration_seconds";
/// Counter of unresolved routes.
pub const ROUTE_MISSES_TOTAL: &str = "ferrule_route_misses_total";
/// Counter of middleware halts.
pub const HALTS_TOTAL: &str = "ferrule_halts_total";
/// Gauge of requests being processed.
pub const IN_FLIGHT_REQUESTS: &str = "ferrule_in_flight_requests";

/// Registers descriptions for all standard metrics.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests dispatched");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Request duration in seconds"
    );
    describe_counter!(
        ROUTE_MISSES_TOTAL,
        "Total number of requests that matched no route"
    );
    describe_counter!(HALTS_TOTAL, "Total number of requests halted by middleware");
    describe_gauge!(
        IN_FLIGHT_REQUESTS,
        "Number of requests currently being processed"
    );
}

/// Records a completed request.
///
/// Updates the following metrics:
/// - `ferrule_requests_total` (incremented)
/// - `ferrule_request_duration_seconds` (histogram observation)
pub fn record_request(handler: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "handler" => handler.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "handler" => handler.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request that matched no route.
pub fn record_route_miss(method: &str) {
    counter!(ROUTE_MISSES_TOTAL, "method" => method.to_string()).increment(1);
}

/// Records a request halted by middleware.
pub fn record_halt(middleware: &str) {
    counter!(HALTS_TOTAL, "middleware" => middleware.to_string()).increment(1);
}

/// Guard that decrements in-flight requests on drop.
///
/// Use this to ensure in-flight counter is always decremented, even on panic.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight counter.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_share_prefix() {
        for name in [
            REQUESTS_TOTAL,
            REQUEST_DURATION_SECONDS,
            ROUTE_MISSES_TOTAL,
            HALTS_TOTAL,
            IN_FLIGHT_REQUESTS,
        ] {
            assert!(name.starts_with("ferrule_"), "{name}");
        }
    }

    #[test]
    fn test_in_flight_guard() {
        let guard = InFlightGuard::new();
        drop(guard);
    }

    #[test]
    fn test_record_functions_without_recorder() {
        describe_metrics();
        record_request("GetItem", 200, Duration::from_millis(10));
        record_route_miss("GET");
        record_halt("authenticate");
    }
}
