//! Authorization initiation and identity callback handlers.

use axum::{extract::State, Json};
use tracing::instrument;

use sinetti_db::Role;

use crate::error::{SigningError, SigningResult};
use crate::models::{CallbackRequest, CallbackResponse, CallbackStatus, InitAuthRequest, InitAuthResponse};
use crate::router::SigningState;
use crate::services::CosignOutcome;

/// Start the signing flow for one party.
///
/// POST /auth/init
#[instrument(skip(state, req))]
pub async fn init(
    State(state): State<SigningState>,
    Json(req): Json<InitAuthRequest>,
) -> SigningResult<Json<InitAuthResponse>> {
    let initiated = state
        .authorize
        .initiate(req.document_id, req.role, &req.redirect_uri)
        .await?;

    Ok(Json(InitAuthResponse {
        auth_url: initiated.auth_url,
        continuation: initiated.continuation,
    }))
}

/// Complete the signing flow after the provider redirect.
///
/// POST /auth/callback
#[instrument(skip(state, req))]
pub async fn callback(
    State(state): State<SigningState>,
    Json(req): Json<CallbackRequest>,
) -> SigningResult<Json<CallbackResponse>> {
    // The continuation token is the only trusted carrier of the signing
    // role. It must be bound to the same document the provider echoed
    // back in `state`.
    let continuation = state
        .keys
        .verify_continuation(&req.continuation)
        .map_err(|err| {
            tracing::warn!(error = ?err, "Continuation verification failed");
            SigningError::InvalidContinuation
        })?;
    if continuation.sub != req.state.to_string() {
        tracing::warn!(document_id = %req.state, "Continuation bound to a different document");
        return Err(SigningError::InvalidContinuation);
    }
    let role: Role = continuation
        .role
        .parse()
        .map_err(|_| SigningError::InvalidContinuation)?;

    let identity = state.token.exchange(&req.code, &req.redirect_uri).await?;

    let outcome = state
        .cosign
        .record_identity(req.state, role, &identity.verified_name)
        .await?;

    let response = match outcome {
        CosignOutcome::Waiting => CallbackResponse {
            status: CallbackStatus::Waiting,
            download_url: None,
        },
        CosignOutcome::Done { download_url } => CallbackResponse {
            status: CallbackStatus::Done,
            download_url: Some(download_url),
        },
    };
    Ok(Json(response))
}
