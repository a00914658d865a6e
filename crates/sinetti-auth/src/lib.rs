//! sinetti-auth: key material and token construction for the co-signing
//! protocol.
//!
//! Holds the service's RSA signing and decryption keys (loaded once at
//! startup, immutable afterwards) and produces the short-lived signed
//! JWTs the identity provider requires: JAR request objects, client
//! assertions, and our own continuation tokens. Also decrypts the
//! provider's encrypted (JWE) identity token.
//!
//! # Modules
//!
//! - [`keys`] - `KeyMaterial`: validated process-lifetime key material
//! - [`claims`] - claim sets for the tokens this service signs
//! - [`jwt`] - RS256 signing, continuation verification, unverified decode
//! - [`jwe`] - compact JWE decryption (RSA-OAEP + AES-GCM)
//! - [`error`] - `AuthError`

pub mod claims;
pub mod error;
pub mod jwe;
pub mod jwt;
pub mod keys;

pub use claims::{ClientAssertionClaims, ContinuationClaims, RequestObjectClaims};
pub use error::{AuthError, AuthResult};
pub use jwt::decode_claims;
pub use keys::KeyMaterial;

/// `client_assertion_type` value for private-key JWT client authentication.
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
