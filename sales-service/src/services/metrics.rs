//! Prometheus metrics for sales-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "sales_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Submitted order counter.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_orders_submitted_total",
        "Total number of sales orders submitted through the gateway",
        &["status"] // ok, error - not customer to avoid cardinality explosion
    )
    .expect("Failed to register orders_submitted_total")
});

/// Recorded payment counter.
pub static PAYMENTS_RECORDED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_payments_recorded_total",
        "Total number of payment entries recorded",
        &["status"]
    )
    .expect("Failed to register payments_recorded_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_errors_total",
        "Total number of errors by type",
        &["error_type"] // db_error, validation_error, etc.
    )
    .expect("Failed to register errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&ORDERS_SUBMITTED_TOTAL);
    Lazy::force(&PAYMENTS_RECORDED_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
