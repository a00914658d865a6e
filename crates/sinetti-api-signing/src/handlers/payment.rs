//! Payment processor webhook handler.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::instrument;

use crate::error::{SigningError, SigningResult};
use crate::models::PaymentEvent;
use crate::router::SigningState;

/// Signature header set by the payment processor: hex-encoded
/// HMAC-SHA256 of the raw request body under the shared webhook secret.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

const SUCCEEDED_EVENT: &str = "payment_intent.succeeded";

/// Record a party's payment from a verified webhook event.
///
/// POST /webhooks/payment
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<SigningState>,
    headers: HeaderMap,
    body: Bytes,
) -> SigningResult<Json<serde_json::Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(SigningError::InvalidWebhookSignature)?;
    if !verify_signature(&state.webhook_secret, &body, signature) {
        return Err(SigningError::InvalidWebhookSignature);
    }

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|_| SigningError::InvalidRequest("Malformed webhook payload".to_string()))?;

    if event.event_type != SUCCEEDED_EVENT {
        tracing::debug!(event_type = %event.event_type, "Ignoring unhandled webhook event");
        return Ok(Json(serde_json::json!({ "received": true })));
    }

    let metadata = &event.data.object.metadata;
    state
        .cosign
        .record_payment(metadata.document_id, metadata.role)
        .await?;

    Ok(Json(serde_json::json!({ "received": true })))
}

/// Constant-time verification of the webhook body signature.
fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_matching_signature() {
        let body = br#"{"type":"payment_intent.succeeded"}"#;
        let sig = sign("whsec_test", body);
        assert!(verify_signature("whsec_test", body, &sig));
    }

    #[test]
    fn rejects_wrong_secret_and_tampered_body() {
        let body = br#"{"type":"payment_intent.succeeded"}"#;
        let sig = sign("whsec_test", body);
        assert!(!verify_signature("whsec_other", body, &sig));
        assert!(!verify_signature("whsec_test", b"tampered", &sig));
        assert!(!verify_signature("whsec_test", body, "not-hex"));
    }
}
