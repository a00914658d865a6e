//! Error types for key handling and token operations.

use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors produced while signing, verifying or decrypting tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Map jsonwebtoken errors onto `AuthError`.
pub(crate) fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidToken("Signature mismatch".to_string()),
        ErrorKind::InvalidAlgorithm => {
            AuthError::UnsupportedAlgorithm("Unexpected token algorithm".to_string())
        }
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidToken(format!("Missing required claim: {claim}"))
        }
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}
