//! Object storage collaborator.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{SigningError, SigningResult};

/// Document byte storage. Paths are `{document_id}/{file_name}`.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch the current bytes at a path.
    async fn download(&self, path: &str) -> SigningResult<Vec<u8>>;

    /// Write bytes at a path, replacing any existing object.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> SigningResult<()>;

    /// Produce a retrieval URL that stops working after `ttl`.
    async fn create_time_limited_link(&self, path: &str, ttl: Duration) -> SigningResult<String>;
}

/// In-memory storage for tests and local development.
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn download(&self, path: &str) -> SigningResult<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| SigningError::Storage(format!("Object not found: {path}")))
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> SigningResult<()> {
        self.objects.lock().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn create_time_limited_link(&self, path: &str, ttl: Duration) -> SigningResult<String> {
        if !self.objects.lock().await.contains_key(path) {
            return Err(SigningError::Storage(format!("Object not found: {path}")));
        }
        Ok(format!(
            "memory://{}?expires_in={}",
            urlencoding::encode(path),
            ttl.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_overwrites_existing_object() {
        let storage = InMemoryStorage::new();
        storage.upload("doc/a.pdf", b"v1".to_vec()).await.unwrap();
        storage.upload("doc/a.pdf", b"v2".to_vec()).await.unwrap();
        assert_eq!(storage.download("doc/a.pdf").await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn link_requires_existing_object() {
        let storage = InMemoryStorage::new();
        let err = storage
            .create_time_limited_link("missing", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Storage(_)));
    }
}
