//! PostgreSQL implementation of the ERP store contract.

use crate::models::{
    DailyOrderLog, DailyPaymentLog, InvoiceDigest, LedgerEntry, NewPaymentEntry, OpenSalesOrder,
    OutstandingInvoice, PaymentDigest, PaymentMode, PaymentScheduleRow, SalesOrder,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::SalesStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "sales-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn payment_schedule(&self, order: &str) -> Result<Vec<PaymentScheduleRow>, AppError> {
        let rows = sqlx::query_as::<_, PaymentScheduleRow>(
            r#"
            SELECT due_date, invoice_portion, payment_amount, description
            FROM payment_schedule
            WHERE order_name = $1
            ORDER BY idx
            "#,
        )
        .bind(order)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to load payment schedule: {}", e))
        })?;
        Ok(rows)
    }
}

#[async_trait]
impl SalesStore for Database {
    /// Check database health.
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn customer_exists(&self, customer: &str) -> Result<bool, AppError> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT name FROM customers WHERE name = $1 AND NOT disabled",
        )
        .bind(customer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to look up customer: {}", e)))?;
        Ok(found.is_some())
    }

    #[instrument(skip(self), fields(order = %name))]
    async fn sales_order(&self, name: &str) -> Result<Option<SalesOrder>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["sales_order"])
            .start_timer();

        let order = sqlx::query_as::<_, SalesOrder>(
            r#"
            SELECT name, customer, company, naming_series, order_type,
                   transaction_date, delivery_date, net_total, grand_total,
                   rounded_total, advance_paid, per_billed, docstatus, creation
            FROM sales_orders
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get sales order: {}", e)))?;

        let order = match order {
            Some(mut order) => {
                order.payment_schedule = self.payment_schedule(name).await?;
                Some(order)
            }
            None => None,
        };

        timer.observe_duration();

        Ok(order)
    }

    #[instrument(skip(self, order), fields(order = %order.name))]
    async fn submit_sales_order(&self, order: &SalesOrder) -> Result<SalesOrder, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["submit_sales_order"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let submitted = sqlx::query_as::<_, SalesOrder>(
            r#"
            UPDATE sales_orders
            SET company = $2,
                naming_series = $3,
                order_type = $4,
                transaction_date = $5,
                delivery_date = $6,
                docstatus = 1
            WHERE name = $1 AND docstatus = 0
            RETURNING name, customer, company, naming_series, order_type,
                      transaction_date, delivery_date, net_total, grand_total,
                      rounded_total, advance_paid, per_billed, docstatus, creation
            "#,
        )
        .bind(&order.name)
        .bind(&order.company)
        .bind(&order.naming_series)
        .bind(&order.order_type)
        .bind(order.transaction_date)
        .bind(order.delivery_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to submit sales order: {}", e))
        })?;

        let mut submitted = submitted.ok_or_else(|| {
            AppError::Conflict(anyhow::anyhow!(
                "Sales order '{}' is not an open draft",
                order.name
            ))
        })?;

        sqlx::query("DELETE FROM payment_schedule WHERE order_name = $1")
            .bind(&order.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clear payment schedule: {}", e))
            })?;

        for (idx, row) in order.payment_schedule.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO payment_schedule
                    (order_name, idx, due_date, invoice_portion, payment_amount, description)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&order.name)
            .bind(idx as i32 + 1)
            .bind(row.due_date)
            .bind(row.invoice_portion)
            .bind(row.payment_amount)
            .bind(&row.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to save payment schedule: {}", e))
            })?;
        }

        tx.commit().await?;

        submitted.payment_schedule = order.payment_schedule.clone();

        timer.observe_duration();

        info!(order = %submitted.name, customer = %submitted.customer, "Sales order submitted");

        Ok(submitted)
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn open_sales_orders(
        &self,
        customer: &str,
        limit: usize,
    ) -> Result<Vec<OpenSalesOrder>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["open_sales_orders"])
            .start_timer();

        let orders = sqlx::query_as::<_, OpenSalesOrder>(
            r#"
            SELECT name, transaction_date, grand_total, advance_paid
            FROM sales_orders
            WHERE customer = $1
              AND docstatus = 1
              AND (CASE WHEN rounded_total <> 0 THEN rounded_total ELSE grand_total END)
                  > advance_paid
              AND ABS(100 - per_billed) > 0.01
            ORDER BY transaction_date DESC NULLS LAST, creation DESC
            LIMIT $2
            "#,
        )
        .bind(customer)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list open sales orders: {}", e))
        })?;

        timer.observe_duration();

        Ok(orders)
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn outstanding_invoices(
        &self,
        customer: &str,
    ) -> Result<Vec<OutstandingInvoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["outstanding_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, OutstandingInvoice>(
            r#"
            SELECT name, posting_date, grand_total, outstanding_amount
            FROM sales_invoices
            WHERE customer = $1 AND docstatus = 1 AND outstanding_amount > 0
            ORDER BY posting_date, name
            "#,
        )
        .bind(customer)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list outstanding invoices: {}", e))
        })?;

        timer.observe_duration();

        Ok(invoices)
    }

    #[instrument(skip(self), fields(customer = %customer, invoice = %name))]
    async fn outstanding_invoice(
        &self,
        customer: &str,
        name: &str,
    ) -> Result<Option<OutstandingInvoice>, AppError> {
        let invoice = sqlx::query_as::<_, OutstandingInvoice>(
            r#"
            SELECT name, posting_date, grand_total, outstanding_amount
            FROM sales_invoices
            WHERE customer = $1 AND name = $2 AND docstatus = 1 AND outstanding_amount > 0
            "#,
        )
        .bind(customer)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        Ok(invoice)
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn last_invoice(&self, customer: &str) -> Result<Option<InvoiceDigest>, AppError> {
        let invoice = sqlx::query_as::<_, InvoiceDigest>(
            r#"
            SELECT name, posting_date, grand_total
            FROM sales_invoices
            WHERE customer = $1 AND docstatus = 1
            ORDER BY posting_date DESC, name DESC
            LIMIT 1
            "#,
        )
        .bind(customer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get last invoice: {}", e)))?;

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn payment_modes(&self) -> Result<Vec<PaymentMode>, AppError> {
        let modes = sqlx::query_as::<_, PaymentMode>(
            "SELECT name, mode_type FROM payment_modes WHERE enabled ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list payment modes: {}", e))
        })?;

        Ok(modes)
    }

    #[instrument(skip(self), fields(mode = %mode, company = %company))]
    async fn mode_account(
        &self,
        mode: &str,
        company: &str,
    ) -> Result<Option<String>, AppError> {
        let account: Option<String> = sqlx::query_scalar(
            "SELECT account FROM mode_accounts WHERE mode = $1 AND company = $2",
        )
        .bind(mode)
        .bind(company)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to resolve mode account: {}", e))
        })?;

        Ok(account)
    }

    #[instrument(skip(self), fields(company = %company))]
    async fn receivable_account(&self, company: &str) -> Result<Option<String>, AppError> {
        let account: Option<Option<String>> = sqlx::query_scalar(
            "SELECT default_receivable_account FROM companies WHERE name = $1",
        )
        .bind(company)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to resolve receivable account: {}", e))
        })?;

        Ok(account.flatten())
    }

    #[instrument(skip(self, entry), fields(party = %entry.party, mode = %entry.mode_of_payment))]
    async fn create_payment_entry(&self, entry: &NewPaymentEntry) -> Result<String, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_payment_entry"])
            .start_timer();

        let name = format!("PE-{}", Uuid::new_v4());

        // Insert and submit are one transaction; a failure on any reference
        // line leaves nothing behind.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payment_entries
                (name, party, posting_date, mode_of_payment, paid_amount,
                 paid_from, paid_to, payment_type, docstatus)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'Receive', 1)
            "#,
        )
        .bind(&name)
        .bind(&entry.party)
        .bind(entry.posting_date)
        .bind(&entry.mode_of_payment)
        .bind(entry.paid_amount)
        .bind(&entry.paid_from)
        .bind(&entry.paid_to)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create payment entry: {}", e))
        })?;

        for (idx, reference) in entry.references.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO payment_references
                    (entry_name, idx, reference_kind, reference_name,
                     total_amount, outstanding_amount, allocated_amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&name)
            .bind(idx as i32 + 1)
            .bind(reference.reference_kind.as_str())
            .bind(&reference.reference_name)
            .bind(reference.total_amount)
            .bind(reference.outstanding_amount)
            .bind(reference.allocated_amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to save payment reference: {}",
                    e
                ))
            })?;
        }

        tx.commit().await?;

        timer.observe_duration();

        info!(
            entry = %name,
            party = %entry.party,
            paid_amount = %entry.paid_amount,
            "Payment entry recorded"
        );

        Ok(name)
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn last_payment(&self, customer: &str) -> Result<Option<PaymentDigest>, AppError> {
        let payment = sqlx::query_as::<_, PaymentDigest>(
            r#"
            SELECT name, posting_date, paid_amount
            FROM payment_entries
            WHERE party = $1 AND docstatus = 1
            ORDER BY posting_date DESC, creation DESC
            LIMIT 1
            "#,
        )
        .bind(customer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get last payment: {}", e)))?;

        Ok(payment)
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn outstanding_balance(&self, customer: &str) -> Result<Decimal, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["outstanding_balance"])
            .start_timer();

        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(debit - credit), 0)
            FROM ledger_entries
            WHERE party_type = 'Customer' AND party = $1 AND NOT is_cancelled
            "#,
        )
        .bind(customer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get outstanding balance: {}", e))
        })?;

        timer.observe_duration();

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    #[instrument(skip(self), fields(customer = %customer, before = %before))]
    async fn opening_balance(
        &self,
        customer: &str,
        before: NaiveDate,
    ) -> Result<Decimal, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["opening_balance"])
            .start_timer();

        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(debit - credit), 0)
            FROM ledger_entries
            WHERE party_type = 'Customer'
              AND party = $1
              AND NOT is_cancelled
              AND posting_date < $2
            "#,
        )
        .bind(customer)
        .bind(before)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get opening balance: {}", e))
        })?;

        timer.observe_duration();

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    #[instrument(skip(self), fields(customer = %customer))]
    async fn ledger_entries(
        &self,
        customer: &str,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["ledger_entries"])
            .start_timer();

        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT posting_date, voucher_type, voucher_no, debit, credit,
                   account, party_type, party, company, is_cancelled, creation
            FROM ledger_entries
            WHERE party_type = 'Customer'
              AND party = $1
              AND NOT is_cancelled
              AND ($2::date IS NULL OR posting_date >= $2)
              AND ($3::date IS NULL OR posting_date <= $3)
            ORDER BY posting_date, creation
            "#,
        )
        .bind(customer)
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get ledger entries: {}", e))
        })?;

        timer.observe_duration();

        Ok(entries)
    }

    #[instrument(skip(self), fields(date = %date))]
    async fn orders_on(&self, date: NaiveDate) -> Result<Vec<DailyOrderLog>, AppError> {
        let orders = sqlx::query_as::<_, DailyOrderLog>(
            r#"
            SELECT name, customer, transaction_date, grand_total, docstatus
            FROM sales_orders
            WHERE transaction_date = $1 AND docstatus <> 2
            ORDER BY creation
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get daily orders: {}", e)))?;

        Ok(orders)
    }

    #[instrument(skip(self), fields(date = %date))]
    async fn payments_on(&self, date: NaiveDate) -> Result<Vec<DailyPaymentLog>, AppError> {
        let payments = sqlx::query_as::<_, DailyPaymentLog>(
            r#"
            SELECT name, party, mode_of_payment, paid_amount
            FROM payment_entries
            WHERE posting_date = $1 AND docstatus = 1 AND payment_type = 'Receive'
            ORDER BY creation
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get daily payments: {}", e))
        })?;

        Ok(payments)
    }
}
