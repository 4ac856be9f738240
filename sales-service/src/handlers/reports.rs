//! End-of-day register views: today's totals and the per-record log.

use crate::dtos::DailyLogParams;
use crate::middleware::UserId;
use crate::models::{DailySummary, DailyTotals, DocKind};
use crate::startup::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use service_core::error::AppError;
use tracing::instrument;

/// Same-day `{count, total}` pairs for orders and received payments.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn daily_summary(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<DailySummary>, AppError> {
    let today = Utc::now().date_naive();
    let orders = state.store.orders_on(today).await?;
    let payments = state.store.payments_on(today).await?;

    Ok(Json(DailySummary {
        sales_orders: DailyTotals::fold(orders.into_iter().map(|order| order.grand_total)),
        payments: DailyTotals::fold(payments.into_iter().map(|payment| payment.paid_amount)),
    }))
}

/// Raw per-record log behind the summary, one document kind at a time.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn daily_log(
    State(state): State<AppState>,
    user: UserId,
    Query(params): Query<DailyLogParams>,
) -> Result<Response, AppError> {
    let today = Utc::now().date_naive();
    let response = match params.kind {
        DocKind::SalesOrder => Json(state.store.orders_on(today).await?).into_response(),
        DocKind::PaymentEntry => Json(state.store.payments_on(today).await?).into_response(),
    };
    Ok(response)
}
