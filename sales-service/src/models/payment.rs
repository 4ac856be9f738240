//! Payment entry construction: modes, references and allocation rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;

/// Mode of payment as configured in the ERP.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentMode {
    pub name: String,
    pub mode_type: String,
}

/// Order modes for the tender screen: "Cash" first, remainder alphabetical.
pub fn sort_payment_modes(modes: &mut [PaymentMode]) {
    modes.sort_by(|a, b| {
        let a_cash = a.name == "Cash";
        let b_cash = b.name == "Cash";
        b_cash.cmp(&a_cash).then_with(|| a.name.cmp(&b.name))
    });
}

/// What a payment reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    SalesInvoice,
    SalesOrder,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::SalesInvoice => "sales_invoice",
            ReferenceKind::SalesOrder => "sales_order",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sales_order" => ReferenceKind::SalesOrder,
            _ => ReferenceKind::SalesInvoice,
        }
    }
}

/// One allocation line: part of the payment applied to an invoice, or the
/// advance carried against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReference {
    pub reference_kind: ReferenceKind,
    pub reference_name: String,
    pub total_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub allocated_amount: Decimal,
}

/// Fully resolved payment entry ready for atomic insert + submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentEntry {
    pub party: String,
    pub company: String,
    pub posting_date: NaiveDate,
    pub mode_of_payment: String,
    /// Receivable account the payment settles.
    pub paid_from: String,
    /// Account configured for the mode of payment.
    pub paid_to: String,
    pub paid_amount: Decimal,
    pub references: Vec<PaymentReference>,
}

impl NewPaymentEntry {
    pub fn allocated_total(&self) -> Decimal {
        self.references
            .iter()
            .map(|reference| reference.allocated_amount)
            .sum()
    }

    /// Allocation invariants: a positive amount, no non-positive allocation
    /// lines, and the references never distribute more than the amount paid.
    /// Partial receipt is allowed.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.paid_amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Paid amount must be positive, got {}",
                self.paid_amount
            )));
        }
        if let Some(reference) = self
            .references
            .iter()
            .find(|r| r.allocated_amount <= Decimal::ZERO)
        {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Allocation against '{}' must be positive",
                reference.reference_name
            )));
        }
        let allocated = self.allocated_total();
        if allocated > self.paid_amount {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Allocated total {} exceeds paid amount {}",
                allocated,
                self.paid_amount
            )));
        }
        Ok(())
    }
}
