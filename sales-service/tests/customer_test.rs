mod common;

use axum::http::StatusCode;
use common::*;
use rust_decimal::Decimal;
use sales_service::models::NewPaymentEntry;
use sales_service::services::{MemoryStore, SalesStore};
use std::sync::Arc;

#[tokio::test]
async fn outstanding_invoices_come_oldest_first_without_settled_ones() {
    let store = Arc::new(MemoryStore::new());
    store.add_customer("C1").await;
    store
        .add_invoice("C1", invoice("SINV-0002", day(2024, 2, 1), 100, 30))
        .await;
    store
        .add_invoice("C1", invoice("SINV-0001", day(2024, 1, 1), 50, 50))
        .await;
    store
        .add_invoice("C1", invoice("SINV-0003", day(2024, 3, 1), 80, 0))
        .await;

    let (status, body) = get(
        trusted_app(store),
        "/api/customers/C1/invoices/outstanding",
        "clerk",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let invoices = body.as_array().unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0]["name"], "SINV-0001");
    assert_eq!(invoices[1]["name"], "SINV-0002");
    assert_eq!(invoices[1]["outstanding_amount"], "30");
}

#[tokio::test]
async fn invoices_of_other_customers_stay_invisible() {
    let store = Arc::new(MemoryStore::new());
    store.add_customer("C1").await;
    store.add_customer("C2").await;
    store
        .add_invoice("C2", invoice("SINV-0009", day(2024, 1, 1), 10, 10))
        .await;

    let (status, body) = get(
        trusted_app(store),
        "/api/customers/C1/invoices/outstanding",
        "clerk",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn summary_reports_balance_and_latest_documents() {
    let store = Arc::new(MemoryStore::new());
    store.add_customer("C1").await;
    store
        .add_ledger_entry(ledger_entry("C1", day(2024, 1, 1), 100, 0))
        .await;
    store
        .add_ledger_entry(ledger_entry("C1", day(2024, 2, 1), 0, 40))
        .await;
    store
        .add_invoice("C1", invoice("SINV-0001", day(2024, 1, 1), 100, 60))
        .await;
    store
        .add_invoice("C1", invoice("SINV-0002", day(2024, 2, 15), 70, 70))
        .await;
    store
        .create_payment_entry(&NewPaymentEntry {
            party: "C1".to_string(),
            company: "Demo Company".to_string(),
            posting_date: day(2024, 2, 1),
            mode_of_payment: "Cash".to_string(),
            paid_from: "Debtors - DC".to_string(),
            paid_to: "Cash In Hand - DC".to_string(),
            paid_amount: Decimal::from(40),
            references: vec![],
        })
        .await
        .unwrap();

    let (status, body) = get(trusted_app(store), "/api/customers/C1/summary", "clerk").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outstanding_balance"], "60");
    assert_eq!(body["last_invoice"]["name"], "SINV-0002");
    assert_eq!(body["last_payment"]["paid_amount"], "40");
}

#[tokio::test]
async fn summary_of_a_fresh_customer_is_empty() {
    let store = Arc::new(MemoryStore::new());
    store.add_customer("C1").await;

    let (status, body) = get(trusted_app(store), "/api/customers/C1/summary", "clerk").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outstanding_balance"], "0");
    assert!(body["last_invoice"].is_null());
    assert!(body["last_payment"].is_null());
}

#[tokio::test]
async fn unknown_customer_summary_is_not_found() {
    let store = Arc::new(MemoryStore::new());

    let (status, _) = get(trusted_app(store), "/api/customers/ghost/summary", "clerk").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
