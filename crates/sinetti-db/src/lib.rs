//! sinetti-db: the document record and its persistence collaborator.
//!
//! The document record is the only shared mutable resource in the
//! co-signing flow. Everything that must be race-free — idempotent
//! verified-name recording, the single-winner finalization claim, the
//! monotonic status — lives behind [`repository::DocumentRepository`],
//! with a Postgres implementation (single-statement conditional
//! updates) and an in-memory implementation for tests and development.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{RepositoryError, RepositoryResult};
pub use models::{CreateDocument, Document, DocumentStatus, Role};
pub use repository::{DocumentRepository, InMemoryDocumentRepository, PgDocumentRepository};
