//! Inbound request bodies.

use serde::Deserialize;
use uuid::Uuid;

use sinetti_db::Role;

/// Body for `POST /documents`.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub file_name: String,
    pub sender_email: String,
    pub recipient_email: String,
    /// Original document bytes, base64-encoded.
    pub content_base64: Option<String>,
}

/// Body for `POST /auth/init`.
#[derive(Debug, Deserialize)]
pub struct InitAuthRequest {
    pub document_id: Uuid,
    pub role: Role,
    pub redirect_uri: String,
}

/// Body for `POST /auth/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub code: String,
    /// Echo of the `state` sent at initiation; must match the document
    /// the continuation token is bound to.
    pub state: Uuid,
    pub redirect_uri: String,
    /// Signed continuation token minted at initiation. The role is read
    /// from here, never from client-supplied fields.
    pub continuation: String,
}
