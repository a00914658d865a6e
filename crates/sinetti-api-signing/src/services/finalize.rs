//! Document finalization: stamp, persist, link, notify.

use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use sinetti_db::DocumentRepository;

use crate::error::{SigningError, SigningResult};
use crate::services::notify::Notifier;
use crate::services::stamp::{AuditStamp, DocumentStamper};
use crate::services::storage::ObjectStorage;

/// Retrieval link lifetime.
const DOWNLOAD_LINK_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Runs the finalization sequence for a fully co-signed document.
#[derive(Clone)]
pub struct FinalizeService {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn ObjectStorage>,
    stamper: Arc<dyn DocumentStamper>,
    notifier: Arc<dyn Notifier>,
    time_zone: Tz,
}

impl FinalizeService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn ObjectStorage>,
        stamper: Arc<dyn DocumentStamper>,
        notifier: Arc<dyn Notifier>,
        time_zone: Tz,
    ) -> Self {
        Self {
            repository,
            storage,
            stamper,
            notifier,
            time_zone,
        }
    }

    /// Stamp the document, mark it signed, and notify both parties.
    ///
    /// Safe to re-run from persisted state: stamping overwrites the same
    /// path, `mark_signed` is monotonic, and the retrieval link is
    /// recomputed. Notification failures are logged and never roll back
    /// the signed status.
    #[instrument(skip(self))]
    pub async fn finalize(&self, document_id: Uuid) -> SigningResult<String> {
        let document = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or(SigningError::NotFound(document_id))?;

        let (sender_name, recipient_name) = match (
            &document.sender_verified_name,
            &document.recipient_verified_name,
        ) {
            (Some(s), Some(r)) => (s.clone(), r.clone()),
            _ => {
                return Err(SigningError::StateConflict(
                    "Cannot finalize before both parties have signed".to_string(),
                ))
            }
        };

        let path = document.storage_path();
        let original = self.storage.download(&path).await?;

        let stamped = self.stamper.stamp(
            &original,
            &AuditStamp {
                document_id,
                file_name: document.file_name.clone(),
                signed_at: Utc::now(),
                time_zone: self.time_zone,
                sender_name: sender_name.clone(),
                sender_email: document.sender_email.clone(),
                recipient_name: recipient_name.clone(),
                recipient_email: document.recipient_email.clone(),
            },
        )?;

        self.storage.upload(&path, stamped).await?;
        self.repository.mark_signed(document_id).await?;

        let download_url = self
            .storage
            .create_time_limited_link(&path, DOWNLOAD_LINK_TTL)
            .await?;

        let subject = format!("\"{}\" has been signed by all parties", document.file_name);
        let html = format!(
            "<p>The document <strong>{}</strong> has been signed by {} and {}.</p>\
             <p><a href=\"{}\">Download the signed document</a> (link valid for 24 hours).</p>",
            document.file_name, sender_name, recipient_name, download_url,
        );

        let (sender_sent, recipient_sent) = tokio::join!(
            self.notifier
                .notify(&document.sender_email, &subject, &html),
            self.notifier
                .notify(&document.recipient_email, &subject, &html),
        );
        for (party, result) in [("sender", sender_sent), ("recipient", recipient_sent)] {
            if let Err(err) = result {
                tracing::warn!(
                    document_id = %document_id,
                    party = %party,
                    error = ?err,
                    "Completion notice failed"
                );
            }
        }

        tracing::info!(document_id = %document_id, "Document finalized");

        Ok(download_url)
    }

    /// Recompute the retrieval link for an already finalized document.
    pub async fn download_link(&self, document_id: Uuid) -> SigningResult<String> {
        let document = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or(SigningError::NotFound(document_id))?;
        self.storage
            .create_time_limited_link(&document.storage_path(), DOWNLOAD_LINK_TTL)
            .await
    }
}
