//! Error types for the signing API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use sinetti_auth::AuthError;
use sinetti_db::RepositoryError;

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// Signing flow error types.
#[derive(Debug, Error)]
pub enum SigningError {
    // Configuration errors
    #[error("Invalid signing configuration: {0}")]
    Configuration(String),

    // Provider protocol errors
    #[error("Provider request failed with status {status}")]
    Protocol { status: u16, body: String },

    #[error("Provider response missing request_uri")]
    MissingRequestUri,

    #[error("Token response missing id_token")]
    MissingIdentityToken,

    // Token handling errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Continuation token rejected")]
    InvalidContinuation,

    // State machine errors
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Payment not recorded for {role} on document {document_id}")]
    PaymentRequired { document_id: Uuid, role: String },

    #[error("Document is in a conflicting state: {0}")]
    StateConflict(String),

    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Infrastructure errors
    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for SigningError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            SigningError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "Service is misconfigured".to_string(),
                )
            }
            SigningError::Protocol { status, body } => {
                // SECURITY: Log provider-supplied detail internally but
                // never reflect it to the client.
                tracing::error!(
                    provider_status = %status,
                    provider_body = ?truncate(body, 500),
                    "Provider request failed (details not reflected to client)"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "provider_error",
                    "The identity provider rejected the request".to_string(),
                )
            }
            SigningError::MissingRequestUri => (
                StatusCode::BAD_GATEWAY,
                "provider_error",
                "The identity provider returned an incomplete response".to_string(),
            ),
            SigningError::MissingIdentityToken => (
                StatusCode::BAD_GATEWAY,
                "missing_id_token",
                "The identity provider did not return an identity token".to_string(),
            ),
            SigningError::Auth(err) => {
                tracing::error!("Token handling failed: {:?}", err);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "token_error",
                    "Identity token could not be processed".to_string(),
                )
            }
            SigningError::InvalidContinuation => (
                StatusCode::UNAUTHORIZED,
                "invalid_continuation",
                "Continuation token is missing, expired, or invalid".to_string(),
            ),
            SigningError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "document_not_found",
                format!("Document {id} not found"),
            ),
            SigningError::PaymentRequired { .. } => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_required",
                "Payment must be recorded before signing can start".to_string(),
            ),
            SigningError::StateConflict(msg) => {
                (StatusCode::CONFLICT, "state_conflict", msg.clone())
            }
            SigningError::InvalidWebhookSignature => (
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                "Webhook signature verification failed".to_string(),
            ),
            SigningError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            SigningError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Document storage operation failed".to_string(),
                )
            }
            SigningError::Notification(msg) => {
                tracing::error!("Notification error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "notification_error",
                    "Failed to send notification".to_string(),
                )
            }
            SigningError::HttpRequest(msg) => {
                tracing::error!("HTTP request error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "http_error",
                    "Failed to communicate with external service".to_string(),
                )
            }
            SigningError::Repository(RepositoryError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "document_not_found",
                format!("Document {id} not found"),
            ),
            SigningError::Repository(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for SigningError {
    fn from(err: reqwest::Error) -> Self {
        SigningError::HttpRequest(err.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_do_not_reflect_provider_body() {
        let err = SigningError::Protocol {
            status: 400,
            body: "{\"error\":\"invalid_request\",\"hint\":\"secret detail\"}".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn payment_required_maps_to_402() {
        let err = SigningError::PaymentRequired {
            document_id: Uuid::new_v4(),
            role: "sender".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("päättyy", 2), "pä");
        assert_eq!(truncate("short", 500), "short");
    }
}
