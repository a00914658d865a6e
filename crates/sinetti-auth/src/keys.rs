//! Process-lifetime key material.
//!
//! All keys are parsed and validated once at startup; missing or
//! malformed key material is fatal so the process never serves partial
//! functionality. The struct is held behind an `Arc` and never mutated.

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::claims::{ClientAssertionClaims, ContinuationClaims, RequestObjectClaims};
use crate::error::{AuthError, AuthResult};
use crate::{jwe, jwt};

/// The service's signing and decryption keys.
///
/// The signature key signs request objects, client assertions and
/// continuation tokens; its public half only verifies our own
/// continuation tokens. The encryption key is used exclusively to
/// decrypt the provider's JWE identity token and never signs anything.
pub struct KeyMaterial {
    signature_key: EncodingKey,
    signature_public: DecodingKey,
    signature_kid: String,
    encryption_key: RsaPrivateKey,
}

impl KeyMaterial {
    /// Parse and validate all key material.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if any PEM fails to parse. The
    /// caller (startup configuration) treats this as fatal.
    pub fn from_pems(
        signature_private_pem: &str,
        signature_public_pem: &str,
        signature_kid: impl Into<String>,
        encryption_private_pem: &str,
    ) -> AuthResult<Self> {
        let signature_key = EncodingKey::from_rsa_pem(signature_private_pem.as_bytes())
            .map_err(|e| AuthError::InvalidKey(format!("Invalid signature private key: {e}")))?;
        let signature_public = DecodingKey::from_rsa_pem(signature_public_pem.as_bytes())
            .map_err(|e| AuthError::InvalidKey(format!("Invalid signature public key: {e}")))?;
        let encryption_key = RsaPrivateKey::from_pkcs8_pem(encryption_private_pem)
            .map_err(|e| AuthError::InvalidKey(format!("Invalid encryption private key: {e}")))?;

        Ok(Self {
            signature_key,
            signature_public,
            signature_kid: signature_kid.into(),
            encryption_key,
        })
    }

    /// The key identifier registered with the identity provider.
    #[must_use]
    pub fn signature_kid(&self) -> &str {
        &self.signature_kid
    }

    /// Sign a JAR request object. The header carries the registered kid.
    pub fn sign_request_object(&self, claims: &RequestObjectClaims) -> AuthResult<String> {
        jwt::encode_with_kid(claims, &self.signature_key, &self.signature_kid)
    }

    /// Sign a client assertion authenticating one protocol call.
    pub fn sign_client_assertion(&self, claims: &ClientAssertionClaims) -> AuthResult<String> {
        jwt::encode_with_kid(claims, &self.signature_key, &self.signature_kid)
    }

    /// Sign a continuation token binding `(document, role)` across the
    /// external redirect.
    pub fn sign_continuation(&self, claims: &ContinuationClaims) -> AuthResult<String> {
        jwt::encode_with_kid(claims, &self.signature_key, &self.signature_kid)
    }

    /// Verify a continuation token presented at the callback.
    pub fn verify_continuation(&self, token: &str) -> AuthResult<ContinuationClaims> {
        jwt::verify_continuation(token, &self.signature_public)
    }

    /// Decrypt a compact JWE identity token, yielding the inner signed
    /// token. Fails with `AuthError::Decryption` when the token is
    /// malformed or was encrypted under a different key.
    pub fn decrypt_identity_token(&self, compact_jwe: &str) -> AuthResult<String> {
        jwe::decrypt_compact(&self.encryption_key, compact_jwe)
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("signature_kid", &self.signature_kid)
            .finish_non_exhaustive()
    }
}
