//! # Content Store
//!
//! Function modules are handed to a content-addressed blob store, which
//! answers with an opaque content identifier. The gateway never interprets
//! that identifier; it only embeds it in resource URIs.

mod digest;
mod errors;
mod kubo;

pub use digest::DigestStore;
pub use errors::{StoreError, StoreResult};
pub use kubo::KuboStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StoreConfig, StoreKind};

/// A content-addressed blob store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes, returning their content identifier
    async fn put(&self, bytes: &[u8]) -> StoreResult<String>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Build the store selected by configuration
pub fn from_config(config: &StoreConfig) -> Arc<dyn BlobStore> {
    match config.kind {
        StoreKind::Kubo => Arc::new(KuboStore::new(&config.api_url)),
        StoreKind::Digest => Arc::new(DigestStore::new()),
    }
}
