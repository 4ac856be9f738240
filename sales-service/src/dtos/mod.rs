//! Request and response shapes of the HTTP surface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::DocKind;

/// Date window for the customer ledger. Both bounds are optional and
/// inclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerParams {
    pub from_date: Option<chrono::NaiveDate>,
    pub to_date: Option<chrono::NaiveDate>,
}

/// Which document kind the daily log should list.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyLogParams {
    pub kind: DocKind,
}

/// One allocation line in a payment request: how much of the payment the
/// clerk applied to an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub invoice: String,
    pub allocated_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub customer: String,
    pub mode_of_payment: String,
    pub paid_amount: Decimal,
    #[serde(default)]
    pub references: Vec<AllocationRequest>,
    /// Optional order the unallocated remainder is carried against as an
    /// advance.
    #[serde(default)]
    pub sales_order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentResponse {
    pub name: String,
}
