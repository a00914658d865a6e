//! Audit stamping collaborator.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::SigningResult;

/// Fields rendered into the audit stamp.
#[derive(Debug, Clone)]
pub struct AuditStamp {
    pub document_id: Uuid,
    pub file_name: String,
    pub signed_at: DateTime<Utc>,
    pub time_zone: Tz,
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
}

/// Applies an audit stamp to document bytes. Rendering into a specific
/// document format (PDF etc.) is the implementor's concern.
pub trait DocumentStamper: Send + Sync {
    fn stamp(&self, original: &[u8], fields: &AuditStamp) -> SigningResult<Vec<u8>>;
}

/// Appends a plain-text audit block to the document bytes.
#[derive(Default)]
pub struct TextBlockStamper;

impl TextBlockStamper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStamper for TextBlockStamper {
    fn stamp(&self, original: &[u8], fields: &AuditStamp) -> SigningResult<Vec<u8>> {
        let local = fields.signed_at.with_timezone(&fields.time_zone);
        let block = format!(
            "\n--- SIGNATURE RECORD ---\n\
             Document: {} ({})\n\
             Signed: {}\n\
             Sender: {} <{}>\n\
             Recipient: {} <{}>\n\
             Both parties verified their identity with a strong electronic identification provider.\n",
            fields.file_name,
            fields.document_id,
            local.format("%Y-%m-%d %H:%M:%S %Z"),
            fields.sender_name,
            fields.sender_email,
            fields.recipient_name,
            fields.recipient_email,
        );
        let mut stamped = Vec::with_capacity(original.len() + block.len());
        stamped.extend_from_slice(original);
        stamped.extend_from_slice(block.as_bytes());
        Ok(stamped)
    }
}
