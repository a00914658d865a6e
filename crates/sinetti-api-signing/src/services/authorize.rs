//! Authorization initiation via pushed authorization requests.

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use sinetti_auth::{
    ClientAssertionClaims, ContinuationClaims, KeyMaterial, RequestObjectClaims,
    CLIENT_ASSERTION_TYPE,
};
use sinetti_db::{DocumentRepository, DocumentStatus, Role};

use crate::error::{SigningError, SigningResult};
use crate::models::ParResponse;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Static identity provider configuration, registered out of band.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base identifier, e.g. `https://idp.example.com`. Also the `aud`
    /// of request objects and client assertions.
    pub base_url: String,
    pub client_id: String,
    pub scope: String,
    /// Authentication-context hint selecting bank-grade assurance.
    pub acr_values: String,
}

impl ProviderConfig {
    fn par_endpoint(&self) -> String {
        format!("{}/oauth2/par", self.base_url)
    }

    fn authorize_endpoint(&self) -> String {
        format!("{}/oauth2/authorize", self.base_url)
    }

    pub(crate) fn token_endpoint(&self) -> String {
        format!("{}/oauth2/token", self.base_url)
    }
}

/// Outcome of a successful initiation.
#[derive(Debug)]
pub struct InitiatedAuth {
    pub auth_url: String,
    pub continuation: String,
}

/// Builds, signs, and pushes the authorization request for one party.
#[derive(Clone)]
pub struct AuthorizeService {
    client: reqwest::Client,
    keys: Arc<KeyMaterial>,
    repository: Arc<dyn DocumentRepository>,
    provider: ProviderConfig,
}

impl AuthorizeService {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        keys: Arc<KeyMaterial>,
        repository: Arc<dyn DocumentRepository>,
        provider: ProviderConfig,
    ) -> Self {
        Self {
            client,
            keys,
            repository,
            provider,
        }
    }

    /// Initiate authorization for one party of a document.
    ///
    /// Exactly one outbound request is made; any failure leaves no
    /// partial state and no fallback URL is ever composed from inline
    /// parameters.
    ///
    /// The payment gate checks the document, not the party: the single
    /// status column only records that some payment arrived, so once
    /// either party has paid, both may initiate.
    #[instrument(skip(self, redirect_uri))]
    pub async fn initiate(
        &self,
        document_id: Uuid,
        role: Role,
        redirect_uri: &str,
    ) -> SigningResult<InitiatedAuth> {
        let document = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or(SigningError::NotFound(document_id))?;

        if document.status == DocumentStatus::Signed {
            return Err(SigningError::StateConflict(
                "Document is already signed".to_string(),
            ));
        }
        // Payment gate: a party may not start authorization before a
        // payment is recorded on the document.
        if document.status == DocumentStatus::Pending && document.verified_name(role).is_none() {
            return Err(SigningError::PaymentRequired {
                document_id,
                role: role.to_string(),
            });
        }

        let request_claims = RequestObjectClaims::new(
            &self.provider.client_id,
            &self.provider.base_url,
            redirect_uri,
            &self.provider.scope,
            &self.provider.acr_values,
            document_id.to_string(),
        );
        let request_object = self.keys.sign_request_object(&request_claims)?;
        let assertion = self.keys.sign_client_assertion(&ClientAssertionClaims::new(
            &self.provider.client_id,
            &self.provider.base_url,
        ))?;

        let response = self
            .client
            .post(self.provider.par_endpoint())
            .form(&[
                ("client_id", self.provider.client_id.as_str()),
                ("client_assertion_type", CLIENT_ASSERTION_TYPE),
                ("client_assertion", assertion.as_str()),
                ("request", request_object.as_str()),
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

        let par: ParResponse = response
            .json()
            .await
            .map_err(|_| SigningError::MissingRequestUri)?;
        if par.request_uri.is_empty() {
            return Err(SigningError::MissingRequestUri);
        }

        let auth_url = format!(
            "{}?client_id={}&request_uri={}",
            self.provider.authorize_endpoint(),
            urlencoding::encode(&self.provider.client_id),
            urlencoding::encode(&par.request_uri),
        );

        let continuation = self
            .keys
            .sign_continuation(&ContinuationClaims::new(document_id.to_string(), role.as_str()))?;

        tracing::info!(
            document_id = %document_id,
            role = %role,
            "Authorization request pushed"
        );

        Ok(InitiatedAuth {
            auth_url,
            continuation,
        })
    }
}
