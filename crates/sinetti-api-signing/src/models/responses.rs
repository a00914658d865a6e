//! Outbound response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use sinetti_db::{Document, DocumentStatus};

/// Response for `POST /documents`.
#[derive(Debug, Serialize)]
pub struct CreateDocumentResponse {
    pub id: Uuid,
    pub status: DocumentStatus,
}

/// Response for `GET /documents/:id`.
///
/// Verified names are redacted to booleans; the names themselves only
/// appear in the stamped artifact and the notification emails.
#[derive(Debug, Serialize)]
pub struct DocumentStatusResponse {
    pub id: Uuid,
    pub file_name: String,
    pub status: DocumentStatus,
    pub sender_signed: bool,
    pub recipient_signed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentStatusResponse {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            file_name: doc.file_name.clone(),
            status: doc.status,
            sender_signed: doc.sender_verified_name.is_some(),
            recipient_signed: doc.recipient_verified_name.is_some(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Response for `POST /auth/init`.
#[derive(Debug, Serialize)]
pub struct InitAuthResponse {
    /// Browser URL at the provider's authorization endpoint, referencing
    /// the pushed request by `request_uri`.
    pub auth_url: String,
    /// Signed continuation token the client must echo at the callback.
    pub continuation: String,
}

/// Outcome of an identity callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackStatus {
    /// This party's identity is recorded; the counterpart has not
    /// signed yet.
    Waiting,
    /// Both parties are recorded and the document is finalized.
    Done,
}

/// Response for `POST /auth/callback`.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub status: CallbackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}
