//! Sales order submission.

use crate::middleware::UserId;
use crate::models::{DocStatus, SalesOrder};
use crate::services::capabilities;
use crate::services::metrics::{ERRORS_TOTAL, ORDERS_SUBMITTED_TOTAL};
use crate::startup::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use service_core::error::AppError;
use tracing::instrument;

/// Submit a drafted sales order.
///
/// Fills the defaults the draft left blank, backfills a full-payment
/// schedule when none exists, then flips the document to submitted in one
/// store operation. Anything other than an existing draft is rejected
/// before any write.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn submit_order(
    State(state): State<AppState>,
    user: UserId,
    Path(name): Path<String>,
) -> Result<Json<SalesOrder>, AppError> {
    let mut order = state
        .store
        .sales_order(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sales order '{}' does not exist", name)))?;

    state
        .authorizer
        .ensure(&user.0, capabilities::ORDER_SUBMIT, &order.customer)
        .await?;

    if order.status() != DocStatus::Draft {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Sales order '{}' is not an open draft",
            name
        )));
    }

    order.apply_defaults(&state.config.defaults, Utc::now().date_naive());
    order.ensure_payment_schedule();

    let submitted = match state.store.submit_sales_order(&order).await {
        Ok(submitted) => submitted,
        Err(e) => {
            ORDERS_SUBMITTED_TOTAL.with_label_values(&["error"]).inc();
            ERRORS_TOTAL.with_label_values(&["db_error"]).inc();
            return Err(e);
        }
    };
    ORDERS_SUBMITTED_TOTAL.with_label_values(&["ok"]).inc();
    tracing::info!(order = %submitted.name, customer = %submitted.customer, "Sales order submitted");

    Ok(Json(submitted))
}
