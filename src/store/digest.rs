//! Offline store: the content identifier is the SHA-256 digest of the bytes.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::errors::StoreResult;
use super::BlobStore;

/// Local store that derives identifiers without keeping the bytes
#[derive(Debug, Default, Clone)]
pub struct DigestStore;

impl DigestStore {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase hex SHA-256 of `bytes`
    pub fn content_id(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl BlobStore for DigestStore {
    async fn put(&self, bytes: &[u8]) -> StoreResult<String> {
        Ok(Self::content_id(bytes))
    }

    fn name(&self) -> &'static str {
        "digest"
    }
}
