//! Shared test harness: a router over a seeded in-memory store plus
//! request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sales_service::config::{
    DatabaseConfig, OrderDefaults, SalesConfig, SessionConfig,
};
use sales_service::models::{LedgerEntry, OutstandingInvoice, PaymentMode, SalesOrder};
use sales_service::services::{Authorizer, MemoryStore, TrustUpstream};
use sales_service::startup::{build_router, AppState};
use secrecy::Secret;
use serde_json::Value;
use std::sync::{Arc, Once};
use tower::util::ServiceExt;

static TRACING: Once = Once::new();

pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    });
}

pub fn test_config() -> SalesConfig {
    SalesConfig {
        common: service_core::config::Config { port: 0 },
        log_level: "info".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: None,
            max_connections: 5,
            min_connections: 1,
        },
        session: SessionConfig {
            secret: Secret::new("test-session-secret".to_string()),
        },
        defaults: OrderDefaults {
            company: "Demo Company".to_string(),
            naming_series: "SO-".to_string(),
            order_type: "Sales".to_string(),
        },
    }
}

/// Router over the given store with the given policy.
pub fn app_with(store: Arc<MemoryStore>, authorizer: Arc<dyn Authorizer>) -> Router {
    init_test_tracing();
    build_router(AppState {
        config: test_config(),
        store,
        authorizer,
    })
}

/// Router with authorization disabled, as in the BFF-trust deployment.
pub fn trusted_app(store: Arc<MemoryStore>) -> Router {
    app_with(store, Arc::new(TrustUpstream))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: Router, uri: &str, user: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .header("X-User-ID", user)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_anonymous(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET returning the raw body text, for the page shell.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

pub async fn post_json(app: Router, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-User-ID", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// -- Seed builders ---------------------------------------------------------

pub fn ledger_entry(customer: &str, posting_date: NaiveDate, debit: i64, credit: i64) -> LedgerEntry {
    LedgerEntry {
        posting_date,
        voucher_type: "Sales Invoice".to_string(),
        voucher_no: format!("SINV-{}", posting_date),
        debit: Decimal::from(debit),
        credit: Decimal::from(credit),
        account: "Debtors".to_string(),
        party_type: "Customer".to_string(),
        party: customer.to_string(),
        company: "Demo Company".to_string(),
        is_cancelled: false,
        creation: Utc::now(),
    }
}

pub fn draft_order(name: &str, customer: &str, total: i64) -> SalesOrder {
    SalesOrder {
        name: name.to_string(),
        customer: customer.to_string(),
        company: None,
        naming_series: None,
        order_type: None,
        transaction_date: None,
        delivery_date: None,
        net_total: Decimal::from(total),
        grand_total: Decimal::from(total),
        rounded_total: Decimal::ZERO,
        advance_paid: Decimal::ZERO,
        per_billed: Decimal::ZERO,
        docstatus: 0,
        creation: Utc::now(),
        payment_schedule: vec![],
    }
}

pub fn submitted_order(name: &str, customer: &str, total: i64, date: NaiveDate) -> SalesOrder {
    let mut order = draft_order(name, customer, total);
    order.docstatus = 1;
    order.transaction_date = Some(date);
    order
}

pub fn invoice(name: &str, posting_date: NaiveDate, total: i64, outstanding: i64) -> OutstandingInvoice {
    OutstandingInvoice {
        name: name.to_string(),
        posting_date,
        grand_total: Decimal::from(total),
        outstanding_amount: Decimal::from(outstanding),
    }
}

pub fn payment_mode(name: &str) -> PaymentMode {
    PaymentMode {
        name: name.to_string(),
        mode_type: "General".to_string(),
    }
}

pub fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap()
}
