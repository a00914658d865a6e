//! Sinetti signing API
//!
//! HTTP service driving the two-party strong-identity co-signing flow:
//! pushed authorization requests against a bank-grade identity provider,
//! identity callbacks converging on a shared document record, and
//! exactly-once finalization.

mod config;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::info;

use config::Config;
use sinetti_api_signing::services::{
    HttpNotifier, InMemoryStorage, ProviderConfig, TextBlockStamper,
};
use sinetti_api_signing::{create_signing_router, SigningConfig};
use sinetti_auth::KeyMaterial;
use sinetti_db::PgDocumentRepository;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        provider = %config.provider_base_url,
        "Starting signing API"
    );

    // Parse and validate all key material before serving anything.
    let keys = match KeyMaterial::from_pems(
        &config.signing_private_key_pem,
        &config.signing_public_key_pem,
        &config.signing_key_id,
        &config.encryption_private_key_pem,
    ) {
        Ok(k) => Arc::new(k),
        Err(e) => {
            eprintln!("FATAL: Invalid key material: {e}");
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    let http_client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let notifier = HttpNotifier::new(
        http_client.clone(),
        config.email_api_url.clone(),
        config.email_api_key.clone(),
        config.email_from.clone(),
    );

    let app = create_signing_router(SigningConfig {
        provider: ProviderConfig {
            base_url: config.provider_base_url.clone(),
            client_id: config.oauth_client_id.clone(),
            scope: config.oauth_scope.clone(),
            acr_values: config.oauth_acr_values.clone(),
        },
        keys,
        repository: Arc::new(PgDocumentRepository::new(pool)),
        // Document bytes live in process memory until an object store
        // backend is wired in; records and state survive in Postgres.
        storage: Arc::new(InMemoryStorage::new()),
        stamper: Arc::new(TextBlockStamper::new()),
        notifier: Arc::new(notifier),
        webhook_secret: config.payment_webhook_secret.clone(),
        time_zone: config.audit_time_zone,
        http_client,
    })
    .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
