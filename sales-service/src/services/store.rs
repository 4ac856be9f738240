//! The narrow contract against the owning ERP's document store.
//!
//! Handlers never reach the store directly; everything goes through this
//! trait so the gateway can run against PostgreSQL in production and the
//! in-memory store in development and tests.

use crate::models::{
    DailyOrderLog, DailyPaymentLog, InvoiceDigest, LedgerEntry, NewPaymentEntry, OpenSalesOrder,
    OutstandingInvoice, PaymentDigest, PaymentMode, SalesOrder,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;

#[async_trait]
pub trait SalesStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn customer_exists(&self, customer: &str) -> Result<bool, AppError>;

    // -- Sales orders ------------------------------------------------------

    async fn sales_order(&self, name: &str) -> Result<Option<SalesOrder>, AppError>;

    /// Persist defaults and payment schedule, then flip the order to
    /// submitted. Insert and submit are one logical unit; no partial state
    /// may be observable.
    async fn submit_sales_order(&self, order: &SalesOrder) -> Result<SalesOrder, AppError>;

    /// Submitted orders still waiting on money or billing, newest first,
    /// at most `limit` rows.
    async fn open_sales_orders(
        &self,
        customer: &str,
        limit: usize,
    ) -> Result<Vec<OpenSalesOrder>, AppError>;

    // -- Invoices ----------------------------------------------------------

    /// Submitted invoices with an unpaid remainder, oldest first.
    async fn outstanding_invoices(
        &self,
        customer: &str,
    ) -> Result<Vec<OutstandingInvoice>, AppError>;

    async fn outstanding_invoice(
        &self,
        customer: &str,
        name: &str,
    ) -> Result<Option<OutstandingInvoice>, AppError>;

    async fn last_invoice(&self, customer: &str) -> Result<Option<InvoiceDigest>, AppError>;

    // -- Payments ----------------------------------------------------------

    async fn payment_modes(&self) -> Result<Vec<PaymentMode>, AppError>;

    /// Account configured for a mode of payment under a company, when any.
    async fn mode_account(&self, mode: &str, company: &str)
        -> Result<Option<String>, AppError>;

    /// Default receivable account of a company.
    async fn receivable_account(&self, company: &str) -> Result<Option<String>, AppError>;

    /// Atomically insert and submit a payment entry, returning its name.
    async fn create_payment_entry(&self, entry: &NewPaymentEntry) -> Result<String, AppError>;

    async fn last_payment(&self, customer: &str) -> Result<Option<PaymentDigest>, AppError>;

    // -- Ledger ------------------------------------------------------------

    /// sum(debit) - sum(credit) over all non-cancelled entries of the party.
    async fn outstanding_balance(&self, customer: &str) -> Result<Decimal, AppError>;

    /// Same aggregate restricted to entries strictly before `before`.
    async fn opening_balance(&self, customer: &str, before: NaiveDate)
        -> Result<Decimal, AppError>;

    /// Non-cancelled entries in the window, ordered by
    /// `(posting_date, creation)` ascending.
    async fn ledger_entries(
        &self,
        customer: &str,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> Result<Vec<LedgerEntry>, AppError>;

    // -- Daily reporting ---------------------------------------------------

    /// Sales orders posted on `date`, cancelled ones excluded.
    async fn orders_on(&self, date: NaiveDate) -> Result<Vec<DailyOrderLog>, AppError>;

    /// Submitted receive-type payments posted on `date`.
    async fn payments_on(&self, date: NaiveDate) -> Result<Vec<DailyPaymentLog>, AppError>;
}
