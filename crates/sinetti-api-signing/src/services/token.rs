//! Authorization-code exchange and identity token handling.

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use sinetti_auth::{decode_claims, ClientAssertionClaims, KeyMaterial, CLIENT_ASSERTION_TYPE};

use crate::error::{SigningError, SigningResult};
use crate::models::TokenResponse;
use crate::services::authorize::ProviderConfig;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Substituted when the provider omits the `name` claim; the exchange
/// still succeeds so the signature record is never silently dropped.
pub const UNKNOWN_SIGNER: &str = "unknown signer";

/// Verified identity extracted from one exchanged code.
#[derive(Debug)]
pub struct VerifiedIdentity {
    pub verified_name: String,
    pub claims: serde_json::Value,
}

/// Exchanges authorization codes for identity tokens.
#[derive(Clone)]
pub struct TokenService {
    client: reqwest::Client,
    keys: Arc<KeyMaterial>,
    provider: ProviderConfig,
}

impl TokenService {
    #[must_use]
    pub fn new(client: reqwest::Client, keys: Arc<KeyMaterial>, provider: ProviderConfig) -> Self {
        Self {
            client,
            keys,
            provider,
        }
    }

    /// Exchange a single-use authorization code for the signer's
    /// verified identity.
    ///
    /// The exchange is stateless and never retried: the code is
    /// single-use, so a failed attempt must surface to the caller
    /// instead of being replayed.
    #[instrument(skip(self, code, redirect_uri))]
    pub async fn exchange(&self, code: &str, redirect_uri: &str) -> SigningResult<VerifiedIdentity> {
        let assertion = self.keys.sign_client_assertion(&ClientAssertionClaims::new(
            &self.provider.client_id,
            &self.provider.base_url,
        ))?;

        let response = self
            .client
            .post(self.provider.token_endpoint())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.provider.client_id.as_str()),
                ("client_assertion_type", CLIENT_ASSERTION_TYPE),
                ("client_assertion", assertion.as_str()),
            ])
            .timeout(PROVIDER_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SigningError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response.json().await?;
        let id_token = token_response
            .id_token
            .ok_or(SigningError::MissingIdentityToken)?;

        // Five segments means the token is encrypted; unwrap it to the
        // inner signed token first.
        let signed_token = if id_token.matches('.').count() == 4 {
            self.keys.decrypt_identity_token(&id_token)?
        } else {
            id_token
        };

        let claims = decode_claims(&signed_token)?;
        let verified_name = claims
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_SIGNER)
            .to_string();

        tracing::info!(
            name_present = %(verified_name != UNKNOWN_SIGNER),
            "Identity token exchanged"
        );

        Ok(VerifiedIdentity {
            verified_name,
            claims,
        })
    }
}
