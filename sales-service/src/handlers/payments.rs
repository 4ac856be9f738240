//! Payment recording and the tender screen's mode list.

use crate::dtos::{RecordPaymentRequest, RecordPaymentResponse};
use crate::middleware::UserId;
use crate::models::{
    sort_payment_modes, NewPaymentEntry, PaymentMode, PaymentReference, ReferenceKind,
};
use crate::services::capabilities;
use crate::services::metrics::{ERRORS_TOTAL, PAYMENTS_RECORDED_TOTAL};
use crate::startup::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::instrument;

/// Enabled modes of payment, "Cash" first for the tender screen.
pub async fn payment_modes(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMode>>, AppError> {
    let mut modes = state.store.payment_modes().await?;
    sort_payment_modes(&mut modes);
    Ok(Json(modes))
}

/// Record a received payment against a customer.
///
/// Allocations are applied to the named outstanding invoices; any unallocated
/// remainder is carried against the optional sales order as an advance. All
/// account resolution and allocation invariants are checked before the single
/// atomic insert-and-submit, so a rejected payment leaves nothing behind.
#[instrument(skip(state, request), fields(user_id = %user.0, customer = %request.customer))]
pub async fn record_payment(
    State(state): State<AppState>,
    user: UserId,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<RecordPaymentResponse>, AppError> {
    state
        .authorizer
        .ensure(&user.0, capabilities::PAYMENT_RECORD, &request.customer)
        .await?;

    if !state.store.customer_exists(&request.customer).await? {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Customer '{}' does not exist",
            request.customer
        )));
    }

    let company = &state.config.defaults.company;
    let paid_to = state
        .store
        .mode_account(&request.mode_of_payment, company)
        .await?
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "Mode of Payment '{}' has no account configured for company '{}'",
                request.mode_of_payment,
                company
            ))
        })?;
    let paid_from = state
        .store
        .receivable_account(company)
        .await?
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "Company '{}' has no default receivable account",
                company
            ))
        })?;

    let mut references = Vec::with_capacity(request.references.len() + 1);
    for allocation in &request.references {
        let invoice = state
            .store
            .outstanding_invoice(&request.customer, &allocation.invoice)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "No outstanding invoice '{}' for customer '{}'",
                    allocation.invoice,
                    request.customer
                ))
            })?;
        references.push(PaymentReference {
            reference_kind: ReferenceKind::SalesInvoice,
            reference_name: invoice.name,
            total_amount: invoice.grand_total,
            outstanding_amount: invoice.outstanding_amount,
            allocated_amount: allocation.allocated_amount,
        });
    }

    // Remainder not applied to invoices rides on the order as an advance.
    if let Some(order_name) = &request.sales_order {
        let order = state.store.sales_order(order_name).await?.ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Sales order '{}' does not exist", order_name))
        })?;
        if order.customer != request.customer {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Sales order '{}' does not belong to customer '{}'",
                order_name,
                request.customer
            )));
        }
        let allocated: Decimal = references.iter().map(|r| r.allocated_amount).sum();
        let remainder = request.paid_amount - allocated;
        if remainder > Decimal::ZERO {
            references.push(PaymentReference {
                reference_kind: ReferenceKind::SalesOrder,
                reference_name: order.name.clone(),
                total_amount: order.grand_total,
                outstanding_amount: order.billing_total() - order.advance_paid,
                allocated_amount: remainder,
            });
        }
    }

    let entry = NewPaymentEntry {
        party: request.customer.clone(),
        company: company.clone(),
        posting_date: Utc::now().date_naive(),
        mode_of_payment: request.mode_of_payment.clone(),
        paid_from,
        paid_to,
        paid_amount: request.paid_amount,
        references,
    };
    if let Err(e) = entry.validate() {
        ERRORS_TOTAL.with_label_values(&["validation_error"]).inc();
        return Err(e);
    }

    let name = match state.store.create_payment_entry(&entry).await {
        Ok(name) => name,
        Err(e) => {
            PAYMENTS_RECORDED_TOTAL.with_label_values(&["error"]).inc();
            ERRORS_TOTAL.with_label_values(&["db_error"]).inc();
            return Err(e);
        }
    };
    PAYMENTS_RECORDED_TOTAL.with_label_values(&["ok"]).inc();
    tracing::info!(payment = %name, amount = %entry.paid_amount, "Payment recorded");

    Ok(Json(RecordPaymentResponse { name }))
}
