use crate::services::get_metrics;
use axum::response::IntoResponse;

/// Prometheus metrics in text exposition format.
pub async fn metrics_handler() -> impl IntoResponse {
    get_metrics()
}
