//! The persistence collaborator for document records.
//!
//! Every mutation that participates in the co-signing race is a single
//! atomic operation at this seam, so two concurrent identity callbacks
//! for the same document can never both observe "incomplete" or both
//! win the finalization claim.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{CreateDocument, Document, DocumentStatus, Role};

/// Document record read/conditional-update operations.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document record in `pending` status.
    async fn create(&self, input: CreateDocument) -> RepositoryResult<Document>;

    /// Fetch a document by id.
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Document>>;

    /// Idempotently record a role's verified name; a value already
    /// present is kept and the call is a no-op. Returns the record
    /// after the update.
    async fn set_verified_name_if_unset(
        &self,
        id: Uuid,
        role: Role,
        verified_name: &str,
    ) -> RepositoryResult<Document>;

    /// Compare-and-swap the finalization claim. Returns `true` for
    /// exactly one caller per document, and only once both verified
    /// names are present.
    async fn claim_finalization(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Terminal, idempotent transition to `signed`.
    async fn mark_signed(&self, id: Uuid) -> RepositoryResult<Document>;

    /// Record a party's payment (`pending → {sender,recipient}_paid`);
    /// never regresses a signed document.
    async fn record_payment(&self, id: Uuid, role: Role) -> RepositoryResult<Document>;
}

/// Postgres-backed repository. All conditional logic is expressed as
/// single `UPDATE … WHERE` statements in [`Document`]'s model methods.
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, input: CreateDocument) -> RepositoryResult<Document> {
        Ok(Document::create(&self.pool, input).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        Ok(Document::find_by_id(&self.pool, id).await?)
    }

    async fn set_verified_name_if_unset(
        &self,
        id: Uuid,
        role: Role,
        verified_name: &str,
    ) -> RepositoryResult<Document> {
        Document::set_verified_name_if_unset(&self.pool, id, role, verified_name)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn claim_finalization(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(Document::claim_finalization(&self.pool, id).await?)
    }

    async fn mark_signed(&self, id: Uuid) -> RepositoryResult<Document> {
        Document::mark_signed(&self.pool, id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn record_payment(&self, id: Uuid, role: Role) -> RepositoryResult<Document> {
        Document::record_payment(&self.pool, id, role)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }
}

/// In-memory repository with the same conditional-update semantics,
/// used by tests and local development. The single mutex serializes the
/// read-modify-write per call, which is exactly the guarantee the
/// Postgres statements give per document.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, input: CreateDocument) -> RepositoryResult<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            file_name: input.file_name,
            sender_email: input.sender_email,
            recipient_email: input.recipient_email,
            sender_verified_name: None,
            recipient_verified_name: None,
            status: DocumentStatus::Pending,
            finalize_claimed: false,
            created_at: now,
            updated_at: now,
        };
        self.documents
            .lock()
            .await
            .insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Document>> {
        Ok(self.documents.lock().await.get(&id).cloned())
    }

    async fn set_verified_name_if_unset(
        &self,
        id: Uuid,
        role: Role,
        verified_name: &str,
    ) -> RepositoryResult<Document> {
        let mut documents = self.documents.lock().await;
        let document = documents.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        let slot = match role {
            Role::Sender => &mut document.sender_verified_name,
            Role::Recipient => &mut document.recipient_verified_name,
        };
        if slot.is_none() {
            *slot = Some(verified_name.to_string());
            document.updated_at = Utc::now();
        }
        Ok(document.clone())
    }

    async fn claim_finalization(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut documents = self.documents.lock().await;
        let document = documents.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        if !document.finalize_claimed && document.both_identities_recorded() {
            document.finalize_claimed = true;
            document.updated_at = Utc::now();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn mark_signed(&self, id: Uuid) -> RepositoryResult<Document> {
        let mut documents = self.documents.lock().await;
        let document = documents.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        if document.status != DocumentStatus::Signed {
            document.status = DocumentStatus::Signed;
            document.updated_at = Utc::now();
        }
        Ok(document.clone())
    }

    async fn record_payment(&self, id: Uuid, role: Role) -> RepositoryResult<Document> {
        let mut documents = self.documents.lock().await;
        let document = documents.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        if document.status != DocumentStatus::Signed {
            document.status = DocumentStatus::paid_for(role);
            document.updated_at = Utc::now();
        }
        Ok(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn create_input() -> CreateDocument {
        CreateDocument {
            file_name: "agreement.pdf".to_string(),
            sender_email: "sender@example.com".to_string(),
            recipient_email: "recipient@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn verified_name_is_set_exactly_once() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(create_input()).await.unwrap();

        let first = repo
            .set_verified_name_if_unset(doc.id, Role::Sender, "Matti Meikäläinen")
            .await
            .unwrap();
        assert_eq!(first.sender_verified_name.as_deref(), Some("Matti Meikäläinen"));

        // Duplicate callback with a different value: no-op, not an error.
        let second = repo
            .set_verified_name_if_unset(doc.id, Role::Sender, "Someone Else")
            .await
            .unwrap();
        assert_eq!(
            second.sender_verified_name.as_deref(),
            Some("Matti Meikäläinen")
        );
    }

    #[tokio::test]
    async fn claim_requires_both_names_and_fires_once() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(create_input()).await.unwrap();

        assert!(!repo.claim_finalization(doc.id).await.unwrap());

        repo.set_verified_name_if_unset(doc.id, Role::Sender, "A")
            .await
            .unwrap();
        assert!(!repo.claim_finalization(doc.id).await.unwrap());

        repo.set_verified_name_if_unset(doc.id, Role::Recipient, "B")
            .await
            .unwrap();
        assert!(repo.claim_finalization(doc.id).await.unwrap());
        assert!(!repo.claim_finalization(doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_claims_have_exactly_one_winner() {
        // Repeated trials: both callbacks record, then race for the claim.
        for _ in 0..200 {
            let repo = Arc::new(InMemoryDocumentRepository::new());
            let doc = repo.create(create_input()).await.unwrap();

            let a = {
                let repo = Arc::clone(&repo);
                let id = doc.id;
                tokio::spawn(async move {
                    repo.set_verified_name_if_unset(id, Role::Sender, "A")
                        .await
                        .unwrap();
                    repo.claim_finalization(id).await.unwrap()
                })
            };
            let b = {
                let repo = Arc::clone(&repo);
                let id = doc.id;
                tokio::spawn(async move {
                    repo.set_verified_name_if_unset(id, Role::Recipient, "B")
                        .await
                        .unwrap();
                    repo.claim_finalization(id).await.unwrap()
                })
            };

            let (won_a, won_b) = (a.await.unwrap(), b.await.unwrap());
            let winners = usize::from(won_a) + usize::from(won_b);
            // At most one wins; both may lose only if one claim ran
            // between the other's name write and claim, which cannot
            // leave zero winners since the last claim sees both names.
            assert!(
                winners <= 1,
                "two concurrent callers both claimed finalization"
            );
            let final_claim = repo.claim_finalization(doc.id).await.unwrap();
            assert_eq!(
                winners + usize::from(final_claim),
                1,
                "finalization must be claimed exactly once overall"
            );
        }
    }

    #[tokio::test]
    async fn status_never_regresses_from_signed() {
        let repo = InMemoryDocumentRepository::new();
        let doc = repo.create(create_input()).await.unwrap();

        repo.record_payment(doc.id, Role::Sender).await.unwrap();
        let signed = repo.mark_signed(doc.id).await.unwrap();
        assert_eq!(signed.status, DocumentStatus::Signed);

        let after = repo.record_payment(doc.id, Role::Recipient).await.unwrap();
        assert_eq!(after.status, DocumentStatus::Signed);

        let again = repo.mark_signed(doc.id).await.unwrap();
        assert_eq!(again.status, DocumentStatus::Signed);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let repo = InMemoryDocumentRepository::new();
        let err = repo
            .set_verified_name_if_unset(Uuid::new_v4(), Role::Sender, "A")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
