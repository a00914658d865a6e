//! Claim sets for the tokens this service signs.
//!
//! Three token shapes leave this service: the JAR request object pushed
//! to the provider's PAR endpoint, the client assertion authenticating
//! each server-to-server call, and the continuation token that carries
//! the signing party's role across the browser redirect.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request object lifetime in seconds. The object is consumed by the
/// PAR endpoint immediately, so ten minutes is already generous.
pub const REQUEST_OBJECT_TTL_SECS: i64 = 600;

/// Client assertion lifetime in seconds. A fresh assertion is minted
/// per protocol call and never reused.
pub const CLIENT_ASSERTION_TTL_SECS: i64 = 300;

/// Continuation token lifetime in seconds. Must outlive the user's trip
/// through the bank authentication UI.
pub const CONTINUATION_TTL_SECS: i64 = 900;

/// Audience value for continuation tokens. Binds the token to our own
/// callback so it cannot be replayed against any other verifier.
pub const CONTINUATION_AUDIENCE: &str = "sinetti:callback";

/// JAR request object claims (RFC 9101), pushed via PAR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestObjectClaims {
    /// Our registered client identifier.
    pub iss: String,
    /// The identity provider's base identifier, not a full endpoint path.
    pub aud: String,
    pub client_id: String,
    pub response_type: String,
    pub redirect_uri: String,
    pub scope: String,
    /// Opaque correlation token; equals the document id.
    pub state: String,
    /// Authentication-context hint selecting bank-grade assurance.
    pub acr_values: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl RequestObjectClaims {
    /// Build the claims for one authorization request.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        provider_audience: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: impl Into<String>,
        acr_values: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        let client_id = client_id.into();
        let now = Utc::now().timestamp();
        Self {
            iss: client_id.clone(),
            aud: provider_audience.into(),
            client_id,
            response_type: "code".to_string(),
            redirect_uri: redirect_uri.into(),
            scope: scope.into(),
            state: state.into(),
            acr_values: acr_values.into(),
            login_hint: Some("app-initiated".to_string()),
            iat: now,
            exp: now + REQUEST_OBJECT_TTL_SECS,
        }
    }
}

/// Client assertion claims (RFC 7523 private-key JWT).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    /// Fresh random identifier for replay resistance.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl ClientAssertionClaims {
    /// Mint the claims for a fresh assertion. `iss` and `sub` both carry
    /// the client identifier per RFC 7523.
    #[must_use]
    pub fn new(client_id: impl Into<String>, audience: impl Into<String>) -> Self {
        let client_id = client_id.into();
        let now = Utc::now().timestamp();
        Self {
            iss: client_id.clone(),
            sub: client_id,
            aud: audience.into(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + CLIENT_ASSERTION_TTL_SECS,
        }
    }
}

/// Continuation token claims.
///
/// The signing party's role is never trusted from client-held storage;
/// it travels in this server-signed token minted at authorization
/// initiation and presented back at the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationClaims {
    /// The document id this continuation is bound to.
    pub sub: String,
    /// "sender" or "recipient".
    pub role: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl ContinuationClaims {
    #[must_use]
    pub fn new(document_id: impl Into<String>, role: impl Into<String>) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: document_id.into(),
            role: role.into(),
            aud: CONTINUATION_AUDIENCE.to_string(),
            iat: now,
            exp: now + CONTINUATION_TTL_SECS,
        }
    }
}
