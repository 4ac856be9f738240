//! Domain models for sales-service.

mod invoice;
mod ledger;
mod order;
mod payment;
mod report;

pub use invoice::{CustomerSummary, InvoiceDigest, OutstandingInvoice, PaymentDigest};
pub use ledger::{LedgerEntry, LedgerStatement, StatementLine};
pub use order::{DocStatus, OpenSalesOrder, PaymentScheduleRow, SalesOrder, BILLING_TOLERANCE};
pub use payment::{
    sort_payment_modes, NewPaymentEntry, PaymentMode, PaymentReference, ReferenceKind,
};
pub use report::{DailyOrderLog, DailyPaymentLog, DailySummary, DailyTotals, DocKind};
