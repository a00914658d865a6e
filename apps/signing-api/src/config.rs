//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading with validation: required variables must be present
//! and valid, or the application exits with a clear error message. Key
//! material in particular is refused at startup rather than discovered
//! broken on the first signing attempt.

use chrono_tz::Tz;
use std::env;
use thiserror::Error;

/// Configuration errors surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidVar { name: String, message: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub database_url: String,

    /// Identity provider base identifier, e.g. `https://idp.example.com`.
    pub provider_base_url: String,
    pub oauth_client_id: String,
    pub oauth_scope: String,
    pub oauth_acr_values: String,

    /// PEM-encoded RSA private key for signing request objects,
    /// assertions, and continuation tokens.
    pub signing_private_key_pem: String,
    /// Public half, used to verify our own continuation tokens.
    pub signing_public_key_pem: String,
    /// Key identifier registered with the provider.
    pub signing_key_id: String,
    /// PEM-encoded RSA private key for decrypting JWE identity tokens.
    pub encryption_private_key_pem: String,

    /// Shared secret for payment webhook signature verification.
    pub payment_webhook_secret: String,

    /// Time zone rendered into audit stamps.
    pub audit_time_zone: Tz,

    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
}

impl Config {
    /// Load configuration from the environment, reading a `.env` file
    /// first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
                name: "PORT".to_string(),
                message: format!("'{value}' is not a valid port number"),
            })?,
            Err(_) => 8080,
        };

        let audit_time_zone = {
            let value =
                env::var("AUDIT_TIME_ZONE").unwrap_or_else(|_| "Europe/Helsinki".to_string());
            value.parse().map_err(|_| ConfigError::InvalidVar {
                name: "AUDIT_TIME_ZONE".to_string(),
                message: format!("'{value}' is not a known time zone"),
            })?
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: required("DATABASE_URL")?,
            provider_base_url: required("PROVIDER_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())?,
            oauth_client_id: required("OAUTH_CLIENT_ID")?,
            oauth_scope: env::var("OAUTH_SCOPE")
                .unwrap_or_else(|_| "openid profile ssno".to_string()),
            oauth_acr_values: env::var("OAUTH_ACR_VALUES")
                .unwrap_or_else(|_| "urn:grn:authn:fi:bank-id".to_string()),
            signing_private_key_pem: required_pem("SIGNING_PRIVATE_KEY_PEM")?,
            signing_public_key_pem: required_pem("SIGNING_PUBLIC_KEY_PEM")?,
            signing_key_id: required("SIGNING_KEY_ID")?,
            encryption_private_key_pem: required_pem("ENCRYPTION_PRIVATE_KEY_PEM")?,
            payment_webhook_secret: required("PAYMENT_WEBHOOK_SECRET")?,
            audit_time_zone,
            email_api_url: env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            email_api_key: required("EMAIL_API_KEY")?,
            email_from: required("EMAIL_FROM")?,
        })
    }

    /// The socket address string to bind to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

/// A required variable that must look like PEM-encoded key material.
fn required_pem(name: &str) -> Result<String, ConfigError> {
    let value = required(name)?;
    if !value.contains("-----BEGIN") {
        return Err(ConfigError::InvalidVar {
            name: name.to_string(),
            message: "expected PEM-encoded key material".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_check_rejects_non_pem_values() {
        std::env::set_var("TEST_PEM_VAR", "not a key");
        let err = required_pem("TEST_PEM_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));
        std::env::remove_var("TEST_PEM_VAR");
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = required("DEFINITELY_NOT_SET_12345").unwrap_err();
        assert!(err.to_string().contains("DEFINITELY_NOT_SET_12345"));
    }
}
