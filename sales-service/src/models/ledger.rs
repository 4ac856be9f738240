//! Customer ledger model: immutable accounting events and statement assembly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Single general-ledger event against a party. Immutable once posted;
/// cancellation is a flag, never a deletion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub posting_date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub account: String,
    pub party_type: String,
    pub party: String,
    pub company: String,
    pub is_cancelled: bool,
    pub creation: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed movement: debits increase the receivable, credits decrease it.
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Statement line with running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    pub posting_date: NaiveDate,
    pub voucher_type: String,
    pub voucher_no: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub account: String,
    pub running_balance: Decimal,
}

/// Customer ledger for a date window: out-of-window aggregate plus ordered
/// in-window detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStatement {
    pub opening_balance: Decimal,
    pub entries: Vec<StatementLine>,
}

impl LedgerStatement {
    /// Assemble a statement from the opening balance and detail rows.
    /// Rows must already be ordered by `(posting_date, creation)`.
    pub fn assemble(opening_balance: Decimal, entries: Vec<LedgerEntry>) -> Self {
        let mut balance = opening_balance;
        let entries = entries
            .into_iter()
            .map(|entry| {
                balance += entry.signed_amount();
                StatementLine {
                    posting_date: entry.posting_date,
                    voucher_type: entry.voucher_type,
                    voucher_no: entry.voucher_no,
                    debit: entry.debit,
                    credit: entry.credit,
                    account: entry.account,
                    running_balance: balance,
                }
            })
            .collect();

        Self {
            opening_balance,
            entries,
        }
    }

    /// Balance after the last in-window entry.
    pub fn closing_balance(&self) -> Decimal {
        self.entries
            .last()
            .map(|line| line.running_balance)
            .unwrap_or(self.opening_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, debit: i64, credit: i64) -> LedgerEntry {
        LedgerEntry {
            posting_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            voucher_type: "Sales Invoice".to_string(),
            voucher_no: format!("SINV-{:04}", day),
            debit: Decimal::from(debit),
            credit: Decimal::from(credit),
            account: "Debtors".to_string(),
            party_type: "Customer".to_string(),
            party: "C1".to_string(),
            company: "Demo Company".to_string(),
            is_cancelled: false,
            creation: Utc::now(),
        }
    }

    #[test]
    fn signed_amount_is_debit_minus_credit() {
        assert_eq!(entry(1, 100, 0).signed_amount(), Decimal::from(100));
        assert_eq!(entry(1, 0, 40).signed_amount(), Decimal::from(-40));
    }

    #[test]
    fn running_balance_accumulates_from_opening() {
        let statement = LedgerStatement::assemble(
            Decimal::from(200),
            vec![entry(5, 100, 0), entry(6, 0, 30)],
        );

        assert_eq!(statement.opening_balance, Decimal::from(200));
        assert_eq!(statement.entries[0].running_balance, Decimal::from(300));
        assert_eq!(statement.entries[1].running_balance, Decimal::from(270));
        assert_eq!(statement.closing_balance(), Decimal::from(270));
    }

    #[test]
    fn empty_window_keeps_opening_as_closing() {
        let statement = LedgerStatement::assemble(Decimal::from(50), vec![]);
        assert_eq!(statement.closing_balance(), Decimal::from(50));
    }
}
