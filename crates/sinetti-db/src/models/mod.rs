//! Database models.

mod document;

pub use document::{CreateDocument, Document, DocumentStatus, Role};
