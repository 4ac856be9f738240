//! Daily reporting: same-day document folds for the register view.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Document kinds exposed by the daily log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    SalesOrder,
    PaymentEntry,
}

/// `{count, total}` pair for one document kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyTotals {
    pub count: u64,
    pub total: Decimal,
}

impl DailyTotals {
    pub fn fold<I: IntoIterator<Item = Decimal>>(amounts: I) -> Self {
        let mut totals = DailyTotals::default();
        for amount in amounts {
            totals.count += 1;
            totals.total += amount;
        }
        totals
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub sales_orders: DailyTotals,
    pub payments: DailyTotals,
}

/// Raw per-record row for today's sales orders.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DailyOrderLog {
    pub name: String,
    pub customer: String,
    pub transaction_date: Option<NaiveDate>,
    pub grand_total: Decimal,
    pub docstatus: i16,
}

/// Raw per-record row for today's received payments.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DailyPaymentLog {
    pub name: String,
    pub party: String,
    pub mode_of_payment: String,
    pub paid_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_counts_and_sums() {
        let totals = DailyTotals::fold(vec![Decimal::from(100), Decimal::from(50)]);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total, Decimal::from(150));
    }

    #[test]
    fn fold_of_nothing_is_zero() {
        let totals = DailyTotals::fold(vec![]);
        assert_eq!(totals.count, 0);
        assert_eq!(totals.total, Decimal::ZERO);
    }
}
