//! Customer-scoped reads: outstanding invoices, open orders, summary and
//! the ledger statement.

use crate::dtos::LedgerParams;
use crate::middleware::UserId;
use crate::models::{CustomerSummary, LedgerStatement, OpenSalesOrder, OutstandingInvoice};
use crate::services::capabilities;
use crate::startup::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::instrument;

/// Open-order lists are capped; the tender screen only ever shows a page.
const OPEN_ORDER_LIMIT: usize = 50;

async fn ensure_customer(state: &AppState, customer: &str) -> Result<(), AppError> {
    if state.store.customer_exists(customer).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(anyhow::anyhow!(
            "Customer '{}' does not exist",
            customer
        )))
    }
}

/// Submitted invoices with an unpaid remainder, oldest first.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn outstanding_invoices(
    State(state): State<AppState>,
    user: UserId,
    Path(customer): Path<String>,
) -> Result<Json<Vec<OutstandingInvoice>>, AppError> {
    state
        .authorizer
        .ensure(&user.0, capabilities::INVOICE_READ, &customer)
        .await?;
    ensure_customer(&state, &customer).await?;

    let invoices = state.store.outstanding_invoices(&customer).await?;
    Ok(Json(invoices))
}

/// Submitted orders still waiting on money or billing, newest first.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn open_orders(
    State(state): State<AppState>,
    user: UserId,
    Path(customer): Path<String>,
) -> Result<Json<Vec<OpenSalesOrder>>, AppError> {
    state
        .authorizer
        .ensure(&user.0, capabilities::ORDER_READ, &customer)
        .await?;
    ensure_customer(&state, &customer).await?;

    let orders = state
        .store
        .open_sales_orders(&customer, OPEN_ORDER_LIMIT)
        .await?;
    Ok(Json(orders))
}

/// Financial summary card: outstanding balance plus most recent invoice
/// and payment.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn customer_summary(
    State(state): State<AppState>,
    user: UserId,
    Path(customer): Path<String>,
) -> Result<Json<CustomerSummary>, AppError> {
    state
        .authorizer
        .ensure(&user.0, capabilities::CUSTOMER_READ, &customer)
        .await?;
    ensure_customer(&state, &customer).await?;

    let outstanding_balance = state.store.outstanding_balance(&customer).await?;
    let last_invoice = state.store.last_invoice(&customer).await?;
    let last_payment = state.store.last_payment(&customer).await?;

    Ok(Json(CustomerSummary {
        outstanding_balance,
        last_invoice,
        last_payment,
    }))
}

/// Ledger statement for a date window: entries before the window fold into
/// the opening balance, in-window entries carry a running balance.
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn customer_ledger(
    State(state): State<AppState>,
    user: UserId,
    Path(customer): Path<String>,
    Query(params): Query<LedgerParams>,
) -> Result<Json<LedgerStatement>, AppError> {
    state
        .authorizer
        .ensure(&user.0, capabilities::LEDGER_READ, &customer)
        .await?;
    ensure_customer(&state, &customer).await?;

    if let (Some(from), Some(to)) = (params.from_date, params.to_date) {
        if from > to {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "from_date {} is after to_date {}",
                from,
                to
            )));
        }
    }

    let opening_balance = match params.from_date {
        Some(from) => state.store.opening_balance(&customer, from).await?,
        None => Decimal::ZERO,
    };
    let entries = state
        .store
        .ledger_entries(&customer, params.from_date, params.to_date)
        .await?;

    Ok(Json(LedgerStatement::assemble(opening_balance, entries)))
}
