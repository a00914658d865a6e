//! Repository error types.

use thiserror::Error;
use uuid::Uuid;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors surfaced by the document repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
