//! Sales order model: submission-state marker, default filling and the
//! open-order predicate.

use crate::config::OrderDefaults;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tolerance for billing-completion noise on `per_billed`.
pub const BILLING_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Submission-state marker of the external document framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    Draft,
    Submitted,
    Cancelled,
}

impl DocStatus {
    pub fn from_marker(value: i16) -> Self {
        match value {
            1 => DocStatus::Submitted,
            2 => DocStatus::Cancelled,
            _ => DocStatus::Draft,
        }
    }

    pub fn as_marker(&self) -> i16 {
        match self {
            DocStatus::Draft => 0,
            DocStatus::Submitted => 1,
            DocStatus::Cancelled => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Draft => "draft",
            DocStatus::Submitted => "submitted",
            DocStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One payment schedule row on a sales order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentScheduleRow {
    pub due_date: NaiveDate,
    pub invoice_portion: Decimal,
    pub payment_amount: Decimal,
    pub description: Option<String>,
}

/// Sales order document as the gateway sees it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SalesOrder {
    pub name: String,
    pub customer: String,
    pub company: Option<String>,
    pub naming_series: Option<String>,
    pub order_type: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub net_total: Decimal,
    pub grand_total: Decimal,
    pub rounded_total: Decimal,
    pub advance_paid: Decimal,
    pub per_billed: Decimal,
    pub docstatus: i16,
    pub creation: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub payment_schedule: Vec<PaymentScheduleRow>,
}

impl SalesOrder {
    pub fn status(&self) -> DocStatus {
        DocStatus::from_marker(self.docstatus)
    }

    /// Total used for billing comparisons: the rounded total when the
    /// framework computed one, else the grand total.
    pub fn billing_total(&self) -> Decimal {
        if self.rounded_total != Decimal::ZERO {
            self.rounded_total
        } else {
            self.grand_total
        }
    }

    /// A submitted order still waiting on money or billing.
    pub fn is_open(&self) -> bool {
        self.status() == DocStatus::Submitted
            && self.billing_total() > self.advance_paid
            && (Decimal::from(100) - self.per_billed).abs() > BILLING_TOLERANCE
    }

    /// Fill blanks the way the ERP would before submission. Only fields the
    /// draft left empty are touched.
    pub fn apply_defaults(&mut self, defaults: &OrderDefaults, today: NaiveDate) {
        if self.company.as_deref().map_or(true, str::is_empty) {
            self.company = Some(defaults.company.clone());
        }
        if self.naming_series.as_deref().map_or(true, str::is_empty) {
            self.naming_series = Some(defaults.naming_series.clone());
        }
        if self.order_type.as_deref().map_or(true, str::is_empty) {
            self.order_type = Some(defaults.order_type.clone());
        }
        if self.transaction_date.is_none() {
            self.transaction_date = Some(today);
        }
        if self.delivery_date.is_none() {
            self.delivery_date = self.transaction_date;
        }
    }

    /// Backfill a single full-payment schedule row when the draft has none
    /// and carries a non-zero total.
    pub fn ensure_payment_schedule(&mut self) {
        if !self.payment_schedule.is_empty() {
            return;
        }
        let total = if self.grand_total != Decimal::ZERO {
            self.grand_total
        } else {
            self.net_total
        };
        if total == Decimal::ZERO {
            return;
        }
        let due_date = self
            .delivery_date
            .or(self.transaction_date)
            .unwrap_or_else(|| Utc::now().date_naive());
        self.payment_schedule.push(PaymentScheduleRow {
            due_date,
            invoice_portion: Decimal::from(100),
            payment_amount: total,
            description: Some("Full Payment".to_string()),
        });
    }
}

/// Open-order digest returned by the open-orders query.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OpenSalesOrder {
    pub name: String,
    pub transaction_date: Option<NaiveDate>,
    pub grand_total: Decimal,
    pub advance_paid: Decimal,
}

impl From<&SalesOrder> for OpenSalesOrder {
    fn from(order: &SalesOrder) -> Self {
        Self {
            name: order.name.clone(),
            transaction_date: order.transaction_date,
            grand_total: order.grand_total,
            advance_paid: order.advance_paid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> SalesOrder {
        SalesOrder {
            name: name.to_string(),
            customer: "C1".to_string(),
            company: None,
            naming_series: None,
            order_type: None,
            transaction_date: None,
            delivery_date: None,
            net_total: Decimal::from(100),
            grand_total: Decimal::from(100),
            rounded_total: Decimal::ZERO,
            advance_paid: Decimal::ZERO,
            per_billed: Decimal::ZERO,
            docstatus: 0,
            creation: Utc::now(),
            payment_schedule: vec![],
        }
    }

    fn defaults() -> OrderDefaults {
        OrderDefaults {
            company: "Demo Company".to_string(),
            naming_series: "SO-".to_string(),
            order_type: "Sales".to_string(),
        }
    }

    #[test]
    fn defaults_fill_only_blanks() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut order = draft("SO-0001");
        order.company = Some("Other Co".to_string());

        order.apply_defaults(&defaults(), today);

        assert_eq!(order.company.as_deref(), Some("Other Co"));
        assert_eq!(order.naming_series.as_deref(), Some("SO-"));
        assert_eq!(order.order_type.as_deref(), Some("Sales"));
        assert_eq!(order.transaction_date, Some(today));
        assert_eq!(order.delivery_date, Some(today));
    }

    #[test]
    fn payment_schedule_backfilled_for_nonzero_total() {
        let mut order = draft("SO-0002");
        order.transaction_date = Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        order.ensure_payment_schedule();

        assert_eq!(order.payment_schedule.len(), 1);
        let row = &order.payment_schedule[0];
        assert_eq!(row.payment_amount, Decimal::from(100));
        assert_eq!(row.invoice_portion, Decimal::from(100));
        assert_eq!(row.description.as_deref(), Some("Full Payment"));
    }

    #[test]
    fn payment_schedule_untouched_when_present_or_zero() {
        let mut order = draft("SO-0003");
        order.grand_total = Decimal::ZERO;
        order.net_total = Decimal::ZERO;
        order.ensure_payment_schedule();
        assert!(order.payment_schedule.is_empty());

        let mut order = draft("SO-0004");
        order.ensure_payment_schedule();
        order.ensure_payment_schedule();
        assert_eq!(order.payment_schedule.len(), 1);
    }

    #[test]
    fn open_predicate_respects_tolerance_and_advance() {
        let mut order = draft("SO-0005");
        order.docstatus = 1;
        assert!(order.is_open());

        // Fully billed within tolerance: closed.
        order.per_billed = Decimal::new(99995, 3); // 99.995
        assert!(!order.is_open());

        // Billing clearly incomplete: open again.
        order.per_billed = Decimal::from(50);
        assert!(order.is_open());

        // Fully paid in advance: closed.
        order.advance_paid = Decimal::from(100);
        assert!(!order.is_open());

        // Drafts never count as open.
        order.advance_paid = Decimal::ZERO;
        order.docstatus = 0;
        assert!(!order.is_open());
    }

    #[test]
    fn billing_total_prefers_rounded() {
        let mut order = draft("SO-0006");
        order.rounded_total = Decimal::from(99);
        assert_eq!(order.billing_total(), Decimal::from(99));
        order.rounded_total = Decimal::ZERO;
        assert_eq!(order.billing_total(), Decimal::from(100));
    }
}
