//! Party notification collaborator.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{SigningError, SigningResult};

/// Sends a completion notice to one party.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, address: &str, subject: &str, html: &str) -> SigningResult<()>;
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// HTTP email notifier (Resend-style JSON API).
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_address: String,
}

impl HttpNotifier {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        from_address: String,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            from_address,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, address: &str, subject: &str, html: &str) -> SigningResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmailPayload {
                from: &self.from_address,
                to: [address],
                subject,
                html,
            })
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(SigningError::Notification(format!(
                "Email service returned status {status}"
            )));
        }
        Ok(())
    }
}

/// Test double that records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, address: &str, subject: &str, html: &str) -> SigningResult<()> {
        self.sent
            .lock()
            .await
            .push((address.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}
