mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::*;
use rust_decimal::Decimal;
use sales_service::models::NewPaymentEntry;
use sales_service::services::{MemoryStore, SalesStore};
use std::sync::Arc;

async fn seed_today(store: &MemoryStore) {
    let today = Utc::now().date_naive();
    store.add_customer("C1").await;
    store
        .add_order(submitted_order("SO-0001", "C1", 100, today))
        .await;
    store
        .add_order(submitted_order("SO-0002", "C1", 50, today))
        .await;
    store
        .create_payment_entry(&NewPaymentEntry {
            party: "C1".to_string(),
            company: "Demo Company".to_string(),
            posting_date: today,
            mode_of_payment: "Cash".to_string(),
            paid_from: "Debtors - DC".to_string(),
            paid_to: "Cash In Hand - DC".to_string(),
            paid_amount: Decimal::from(30),
            references: vec![],
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn daily_summary_folds_todays_documents() {
    let store = Arc::new(MemoryStore::new());
    seed_today(&store).await;

    let (status, body) = get(trusted_app(store), "/api/reports/daily-summary", "clerk").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sales_orders"]["count"], 2);
    assert_eq!(body["sales_orders"]["total"], "150");
    assert_eq!(body["payments"]["count"], 1);
    assert_eq!(body["payments"]["total"], "30");
}

#[tokio::test]
async fn cancelled_orders_and_other_days_stay_out() {
    let store = Arc::new(MemoryStore::new());
    seed_today(&store).await;

    let today = Utc::now().date_naive();
    let mut cancelled = submitted_order("SO-0003", "C1", 999, today);
    cancelled.docstatus = 2;
    store.add_order(cancelled).await;
    store
        .add_order(submitted_order("SO-0004", "C1", 70, day(2020, 1, 1)))
        .await;

    let (_, body) = get(trusted_app(store), "/api/reports/daily-summary", "clerk").await;

    assert_eq!(body["sales_orders"]["count"], 2);
    assert_eq!(body["sales_orders"]["total"], "150");
}

#[tokio::test]
async fn daily_log_lists_one_document_kind_at_a_time() {
    let store = Arc::new(MemoryStore::new());
    seed_today(&store).await;

    let (status, body) = get(
        trusted_app(store.clone()),
        "/api/reports/daily-log?kind=sales_order",
        "clerk",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["name"], "SO-0001");
    assert_eq!(orders[0]["customer"], "C1");

    let (status, body) = get(
        trusted_app(store),
        "/api/reports/daily-log?kind=payment_entry",
        "clerk",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payments = body.as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["mode_of_payment"], "Cash");
    assert_eq!(payments[0]["paid_amount"], "30");
}

#[tokio::test]
async fn unknown_log_kind_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    seed_today(&store).await;

    let (status, _) = get(
        trusted_app(store),
        "/api/reports/daily-log?kind=purchase_order",
        "clerk",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
