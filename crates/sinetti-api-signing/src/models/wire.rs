//! Provider and payment-processor wire formats.

use serde::Deserialize;
use uuid::Uuid;

use sinetti_db::Role;

/// Successful pushed-authorization response.
#[derive(Debug, Deserialize)]
pub struct ParResponse {
    pub request_uri: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Successful token endpoint response. Only `id_token` matters to the
/// signing flow; the access token is never used downstream.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Payment processor webhook envelope.
#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    /// Event type, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PaymentEventData,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEventData {
    pub object: PaymentIntent,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub metadata: PaymentMetadata,
}

/// Metadata attached to the payment at checkout time, linking the
/// payment back to a document and party.
#[derive(Debug, Deserialize)]
pub struct PaymentMetadata {
    pub document_id: Uuid,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_event_parses_processor_payload() {
        let body = serde_json::json!({
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_123",
                    "metadata": {
                        "document_id": "a5c9f1de-9a1b-4a4e-93a1-0e2f1b6f4d11",
                        "role": "recipient"
                    }
                }
            }
        });
        let event: PaymentEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.data.object.metadata.role, Role::Recipient);
    }

    #[test]
    fn token_response_tolerates_missing_id_token() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"at","token_type":"Bearer"}"#).unwrap();
        assert!(parsed.id_token.is_none());
    }
}
