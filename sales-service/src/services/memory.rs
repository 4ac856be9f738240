//! In-memory implementation of the ERP store contract.
//!
//! Backs the gateway when `DATABASE_URL` is unset and carries the
//! integration tests; the tables live behind one lock, so every operation
//! is an atomic read or write just like a single SQL statement.

use crate::models::{
    DailyOrderLog, DailyPaymentLog, InvoiceDigest, LedgerEntry, NewPaymentEntry, OpenSalesOrder,
    OutstandingInvoice, PaymentDigest, PaymentMode, SalesOrder,
};
use crate::services::store::SalesStore;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredInvoice {
    customer: String,
    docstatus: i16,
    invoice: OutstandingInvoice,
}

#[derive(Debug, Clone)]
pub struct StoredPayment {
    pub name: String,
    pub entry: NewPaymentEntry,
    pub docstatus: i16,
    pub creation: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    customers: HashSet<String>,
    ledger: Vec<LedgerEntry>,
    invoices: Vec<StoredInvoice>,
    orders: Vec<SalesOrder>,
    modes: Vec<PaymentMode>,
    mode_accounts: HashMap<(String, String), String>,
    receivable_accounts: HashMap<String, String>,
    payments: Vec<StoredPayment>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Seeding -----------------------------------------------------------

    pub async fn add_customer(&self, name: &str) {
        self.tables.write().await.customers.insert(name.to_string());
    }

    pub async fn add_ledger_entry(&self, entry: LedgerEntry) {
        self.tables.write().await.ledger.push(entry);
    }

    /// Seed a submitted invoice for a customer.
    pub async fn add_invoice(&self, customer: &str, invoice: OutstandingInvoice) {
        self.tables.write().await.invoices.push(StoredInvoice {
            customer: customer.to_string(),
            docstatus: 1,
            invoice,
        });
    }

    pub async fn add_order(&self, order: SalesOrder) {
        self.tables.write().await.orders.push(order);
    }

    pub async fn add_payment_mode(&self, mode: PaymentMode) {
        self.tables.write().await.modes.push(mode);
    }

    pub async fn set_mode_account(&self, mode: &str, company: &str, account: &str) {
        self.tables
            .write()
            .await
            .mode_accounts
            .insert((mode.to_string(), company.to_string()), account.to_string());
    }

    pub async fn set_receivable_account(&self, company: &str, account: &str) {
        self.tables
            .write()
            .await
            .receivable_accounts
            .insert(company.to_string(), account.to_string());
    }

    // -- Inspection (tests) ------------------------------------------------

    pub async fn payment_entry(&self, name: &str) -> Option<StoredPayment> {
        self.tables
            .read()
            .await
            .payments
            .iter()
            .find(|payment| payment.name == name)
            .cloned()
    }

    pub async fn payment_count(&self) -> usize {
        self.tables.read().await.payments.len()
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn customer_exists(&self, customer: &str) -> Result<bool, AppError> {
        Ok(self.tables.read().await.customers.contains(customer))
    }

    async fn sales_order(&self, name: &str) -> Result<Option<SalesOrder>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .orders
            .iter()
            .find(|order| order.name == name)
            .cloned())
    }

    async fn submit_sales_order(&self, order: &SalesOrder) -> Result<SalesOrder, AppError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .orders
            .iter_mut()
            .find(|stored| stored.name == order.name)
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Sales order '{}' does not exist", order.name))
            })?;
        if stored.docstatus != 0 {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Sales order '{}' is not an open draft",
                order.name
            )));
        }
        *stored = order.clone();
        stored.docstatus = 1;
        Ok(stored.clone())
    }

    async fn open_sales_orders(
        &self,
        customer: &str,
        limit: usize,
    ) -> Result<Vec<OpenSalesOrder>, AppError> {
        let tables = self.tables.read().await;
        let mut open: Vec<&SalesOrder> = tables
            .orders
            .iter()
            .filter(|order| order.customer == customer && order.is_open())
            .collect();
        open.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then_with(|| b.creation.cmp(&a.creation))
        });
        open.truncate(limit);
        Ok(open.into_iter().map(OpenSalesOrder::from).collect())
    }

    async fn outstanding_invoices(
        &self,
        customer: &str,
    ) -> Result<Vec<OutstandingInvoice>, AppError> {
        let tables = self.tables.read().await;
        let mut invoices: Vec<OutstandingInvoice> = tables
            .invoices
            .iter()
            .filter(|stored| {
                stored.customer == customer
                    && stored.docstatus == 1
                    && stored.invoice.outstanding_amount > Decimal::ZERO
            })
            .map(|stored| stored.invoice.clone())
            .collect();
        invoices.sort_by(|a, b| {
            a.posting_date
                .cmp(&b.posting_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(invoices)
    }

    async fn outstanding_invoice(
        &self,
        customer: &str,
        name: &str,
    ) -> Result<Option<OutstandingInvoice>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .invoices
            .iter()
            .find(|stored| {
                stored.customer == customer
                    && stored.invoice.name == name
                    && stored.docstatus == 1
                    && stored.invoice.outstanding_amount > Decimal::ZERO
            })
            .map(|stored| stored.invoice.clone()))
    }

    async fn last_invoice(&self, customer: &str) -> Result<Option<InvoiceDigest>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .invoices
            .iter()
            .filter(|stored| stored.customer == customer && stored.docstatus == 1)
            .max_by(|a, b| {
                a.invoice
                    .posting_date
                    .cmp(&b.invoice.posting_date)
                    .then_with(|| a.invoice.name.cmp(&b.invoice.name))
            })
            .map(|stored| InvoiceDigest {
                name: stored.invoice.name.clone(),
                posting_date: stored.invoice.posting_date,
                grand_total: stored.invoice.grand_total,
            }))
    }

    async fn payment_modes(&self) -> Result<Vec<PaymentMode>, AppError> {
        let mut modes = self.tables.read().await.modes.clone();
        modes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modes)
    }

    async fn mode_account(
        &self,
        mode: &str,
        company: &str,
    ) -> Result<Option<String>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .mode_accounts
            .get(&(mode.to_string(), company.to_string()))
            .cloned())
    }

    async fn receivable_account(&self, company: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .receivable_accounts
            .get(company)
            .cloned())
    }

    async fn create_payment_entry(&self, entry: &NewPaymentEntry) -> Result<String, AppError> {
        let name = format!("PE-{}", Uuid::new_v4());
        self.tables.write().await.payments.push(StoredPayment {
            name: name.clone(),
            entry: entry.clone(),
            docstatus: 1,
            creation: Utc::now(),
        });
        Ok(name)
    }

    async fn last_payment(&self, customer: &str) -> Result<Option<PaymentDigest>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .iter()
            .filter(|payment| payment.entry.party == customer && payment.docstatus == 1)
            .max_by(|a, b| {
                a.entry
                    .posting_date
                    .cmp(&b.entry.posting_date)
                    .then_with(|| a.creation.cmp(&b.creation))
            })
            .map(|payment| PaymentDigest {
                name: payment.name.clone(),
                posting_date: payment.entry.posting_date,
                paid_amount: payment.entry.paid_amount,
            }))
    }

    async fn outstanding_balance(&self, customer: &str) -> Result<Decimal, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ledger
            .iter()
            .filter(|entry| {
                entry.party_type == "Customer" && entry.party == customer && !entry.is_cancelled
            })
            .map(LedgerEntry::signed_amount)
            .sum())
    }

    async fn opening_balance(
        &self,
        customer: &str,
        before: NaiveDate,
    ) -> Result<Decimal, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ledger
            .iter()
            .filter(|entry| {
                entry.party_type == "Customer"
                    && entry.party == customer
                    && !entry.is_cancelled
                    && entry.posting_date < before
            })
            .map(LedgerEntry::signed_amount)
            .sum())
    }

    async fn ledger_entries(
        &self,
        customer: &str,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<LedgerEntry> = tables
            .ledger
            .iter()
            .filter(|entry| {
                entry.party_type == "Customer"
                    && entry.party == customer
                    && !entry.is_cancelled
                    && from_date.map_or(true, |from| entry.posting_date >= from)
                    && to_date.map_or(true, |to| entry.posting_date <= to)
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.posting_date
                .cmp(&b.posting_date)
                .then_with(|| a.creation.cmp(&b.creation))
        });
        Ok(entries)
    }

    async fn orders_on(&self, date: NaiveDate) -> Result<Vec<DailyOrderLog>, AppError> {
        let tables = self.tables.read().await;
        let mut orders: Vec<&SalesOrder> = tables
            .orders
            .iter()
            .filter(|order| order.transaction_date == Some(date) && order.docstatus != 2)
            .collect();
        orders.sort_by(|a, b| a.creation.cmp(&b.creation));
        Ok(orders
            .into_iter()
            .map(|order| DailyOrderLog {
                name: order.name.clone(),
                customer: order.customer.clone(),
                transaction_date: order.transaction_date,
                grand_total: order.grand_total,
                docstatus: order.docstatus,
            })
            .collect())
    }

    async fn payments_on(&self, date: NaiveDate) -> Result<Vec<DailyPaymentLog>, AppError> {
        let tables = self.tables.read().await;
        let mut payments: Vec<&StoredPayment> = tables
            .payments
            .iter()
            .filter(|payment| payment.entry.posting_date == date && payment.docstatus == 1)
            .collect();
        payments.sort_by(|a, b| a.creation.cmp(&b.creation));
        Ok(payments
            .into_iter()
            .map(|payment| DailyPaymentLog {
                name: payment.name.clone(),
                party: payment.entry.party.clone(),
                mode_of_payment: payment.entry.mode_of_payment.clone(),
                paid_amount: payment.entry.paid_amount,
            })
            .collect())
    }
}
