//! The two-party convergence state machine.
//!
//! Each party's identity callback records a verified name exactly once;
//! whichever callback completes the pair wins an atomic finalization
//! claim and runs the finalizer. Losers observe `signed` (or not yet)
//! and report without side effects.

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use sinetti_db::{Document, DocumentRepository, DocumentStatus, Role};

use crate::error::{SigningError, SigningResult};
use crate::services::finalize::FinalizeService;

/// Outcome of recording one party's identity.
#[derive(Debug)]
pub enum CosignOutcome {
    /// Recorded; the counterpart has not signed yet.
    Waiting,
    /// Both parties recorded and the document is finalized.
    Done { download_url: String },
}

/// Drives document state transitions in response to identity callbacks
/// and payment events.
#[derive(Clone)]
pub struct CosignService {
    repository: Arc<dyn DocumentRepository>,
    finalizer: FinalizeService,
}

impl CosignService {
    #[must_use]
    pub fn new(repository: Arc<dyn DocumentRepository>, finalizer: FinalizeService) -> Self {
        Self {
            repository,
            finalizer,
        }
    }

    /// Record one party's verified identity and converge.
    ///
    /// Idempotent: a duplicate callback for an already recorded role is
    /// a no-op that reports the current state. Exactly one caller per
    /// document wins the finalization claim and runs the finalizer.
    #[instrument(skip(self, verified_name))]
    pub async fn record_identity(
        &self,
        document_id: Uuid,
        role: Role,
        verified_name: &str,
    ) -> SigningResult<CosignOutcome> {
        let document = self
            .repository
            .set_verified_name_if_unset(document_id, role, verified_name)
            .await?;

        if !document.both_identities_recorded() {
            tracing::info!(document_id = %document_id, role = %role, "Identity recorded, waiting for counterpart");
            return Ok(CosignOutcome::Waiting);
        }

        if self.repository.claim_finalization(document_id).await? {
            tracing::info!(document_id = %document_id, role = %role, "Finalization claim won");
            let download_url = self.finalizer.finalize(document_id).await?;
            return Ok(CosignOutcome::Done { download_url });
        }

        // Lost the race. Re-read: the winner may already have finished.
        let current = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or(SigningError::NotFound(document_id))?;
        if current.status == DocumentStatus::Signed {
            let download_url = self.finalizer.download_link(document_id).await?;
            Ok(CosignOutcome::Done { download_url })
        } else {
            Ok(CosignOutcome::Waiting)
        }
    }

    /// Record a party's payment. Monotonic; gates authorization
    /// initiation for that party.
    #[instrument(skip(self))]
    pub async fn record_payment(&self, document_id: Uuid, role: Role) -> SigningResult<Document> {
        let document = self.repository.record_payment(document_id, role).await?;
        tracing::info!(document_id = %document_id, role = %role, status = %document.status, "Payment recorded");
        Ok(document)
    }

    /// Re-run finalization from persisted state after a crash between
    /// the claim and `signed`. Identity exchange is never re-run; the
    /// stamp overwrite and status transition are idempotent.
    #[instrument(skip(self))]
    pub async fn retry_finalization(&self, document_id: Uuid) -> SigningResult<String> {
        let document = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or(SigningError::NotFound(document_id))?;

        if !document.both_identities_recorded() {
            return Err(SigningError::StateConflict(
                "Cannot finalize before both parties have signed".to_string(),
            ));
        }

        // Take the claim if a crash left it unset; an already taken
        // claim is fine since this path exists to resume it.
        let _ = self.repository.claim_finalization(document_id).await?;
        self.finalizer.finalize(document_id).await
    }
}
