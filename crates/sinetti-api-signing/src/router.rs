//! Router for the signing API.

use axum::{
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use std::sync::Arc;

use sinetti_auth::KeyMaterial;
use sinetti_db::DocumentRepository;

use crate::handlers::{self, auth, documents, payment};
use crate::services::{
    AuthorizeService, CosignService, DocumentStamper, FinalizeService, Notifier, ObjectStorage,
    ProviderConfig, TokenService,
};

/// Configuration for the signing router.
pub struct SigningConfig {
    pub provider: ProviderConfig,
    pub keys: Arc<KeyMaterial>,
    pub repository: Arc<dyn DocumentRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub stamper: Arc<dyn DocumentStamper>,
    pub notifier: Arc<dyn Notifier>,
    /// Shared secret for payment webhook signature verification.
    pub webhook_secret: String,
    /// Time zone rendered into audit stamps.
    pub time_zone: Tz,
    pub http_client: reqwest::Client,
}

/// Shared state for signing handlers.
#[derive(Clone)]
pub struct SigningState {
    pub repository: Arc<dyn DocumentRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub keys: Arc<KeyMaterial>,
    pub authorize: AuthorizeService,
    pub token: TokenService,
    pub cosign: CosignService,
    pub webhook_secret: String,
}

impl SigningState {
    /// Wire the service graph from configuration.
    #[must_use]
    pub fn new(config: SigningConfig) -> Self {
        let authorize = AuthorizeService::new(
            config.http_client.clone(),
            Arc::clone(&config.keys),
            Arc::clone(&config.repository),
            config.provider.clone(),
        );
        let token = TokenService::new(
            config.http_client,
            Arc::clone(&config.keys),
            config.provider,
        );
        let finalizer = FinalizeService::new(
            Arc::clone(&config.repository),
            Arc::clone(&config.storage),
            config.stamper,
            config.notifier,
            config.time_zone,
        );
        let cosign = CosignService::new(Arc::clone(&config.repository), finalizer);

        Self {
            repository: config.repository,
            storage: config.storage,
            keys: config.keys,
            authorize,
            token,
            cosign,
            webhook_secret: config.webhook_secret,
        }
    }
}

/// Create the full signing router.
///
/// Routes:
/// - POST /documents - Create document record
/// - GET /documents/:id - Document status view
/// - POST /documents/:id/finalize/retry - Re-run finalization
/// - POST /auth/init - Push authorization request
/// - POST /auth/callback - Exchange code, record identity
/// - POST /webhooks/payment - Payment processor webhook
/// - GET /healthz - Liveness
pub fn create_signing_router(config: SigningConfig) -> Router {
    let state = SigningState::new(config);

    Router::new()
        .route("/documents", post(documents::create))
        .route("/documents/:id", get(documents::get))
        .route(
            "/documents/:id/finalize/retry",
            post(documents::retry_finalization),
        )
        .route("/auth/init", post(auth::init))
        .route("/auth/callback", post(auth::callback))
        .route("/webhooks/payment", post(payment::webhook))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
