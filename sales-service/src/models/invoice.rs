//! Read-only invoice projections and the customer financial summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Submitted invoice with an unpaid remainder. `outstanding_amount`
/// monotonically decreases as payments are applied, never below zero.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OutstandingInvoice {
    pub name: String,
    pub posting_date: NaiveDate,
    pub grand_total: Decimal,
    pub outstanding_amount: Decimal,
}

/// Most recent invoice, as shown on the customer summary card.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvoiceDigest {
    pub name: String,
    pub posting_date: NaiveDate,
    pub grand_total: Decimal,
}

/// Most recent received payment for the summary card.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentDigest {
    pub name: String,
    pub posting_date: NaiveDate,
    pub paid_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub outstanding_balance: Decimal,
    pub last_invoice: Option<InvoiceDigest>,
    pub last_payment: Option<PaymentDigest>,
}
