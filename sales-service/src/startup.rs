//! Application startup and lifecycle management.
//!
//! Builds the shared state, wires the router, and runs the HTTP server
//! until a shutdown signal arrives. Binding port 0 hands out a free port,
//! which the test harness relies on.

use crate::config::SalesConfig;
use crate::handlers;
use crate::services::{Authorizer, Database, MemoryStore, SalesStore, TrustUpstream};
use axum::routing::{get, post};
use axum::Router;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: SalesConfig,
    pub store: Arc<dyn SalesStore>,
    pub authorizer: Arc<dyn Authorizer>,
}

/// Full route table of the gateway.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::app::index))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .route(
            "/api/orders/:name/submit",
            post(handlers::orders::submit_order),
        )
        .route(
            "/api/customers/:customer/invoices/outstanding",
            get(handlers::customers::outstanding_invoices),
        )
        .route(
            "/api/customers/:customer/orders/open",
            get(handlers::customers::open_orders),
        )
        .route(
            "/api/customers/:customer/summary",
            get(handlers::customers::customer_summary),
        )
        .route(
            "/api/customers/:customer/ledger",
            get(handlers::customers::customer_ledger),
        )
        .route("/api/payment-modes", get(handlers::payments::payment_modes))
        .route("/api/payments", post(handlers::payments::record_payment))
        .route(
            "/api/reports/daily-summary",
            get(handlers::reports::daily_summary),
        )
        .route("/api/reports/daily-log", get(handlers::reports::daily_log))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Connects to PostgreSQL and runs migrations when `DATABASE_URL` is
    /// set; otherwise runs against the in-memory store.
    pub async fn build(config: SalesConfig) -> Result<Self, AppError> {
        let store: Arc<dyn SalesStore> = match &config.database.url {
            Some(url) => {
                let database = Database::new(
                    url,
                    config.database.max_connections,
                    config.database.min_connections,
                )
                .await?;
                database.run_migrations().await?;
                Arc::new(database)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; running against the in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        if let Err(e) = store.health_check().await {
            tracing::warn!("Store health check failed at startup: {}", e);
        }

        Self::build_with_store(config, store, Arc::new(TrustUpstream)).await
    }

    /// Build with an explicit store and authorizer. Used by tests.
    pub async fn build_with_store(
        config: SalesConfig,
        store: Arc<dyn SalesStore>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self, AppError> {
        let addr = config.common.bind_address();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState {
            config,
            store,
            authorizer,
        };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a clone of the shared state.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        tracing::info!("sales-service listening on port {}", self.port);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
