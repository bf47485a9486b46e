//! IPFS (Kubo RPC) backed store.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use super::errors::{StoreError, StoreResult};
use super::BlobStore;

/// Reply of `POST /api/v0/add`
#[derive(Debug, Deserialize)]
struct AddReply {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Store that uploads modules to a Kubo node
#[derive(Debug, Clone)]
pub struct KuboStore {
    client: reqwest::Client,
    api_url: String,
}

impl KuboStore {
    /// `api_url` is the node's RPC base, e.g. `http://127.0.0.1:5001`
    pub fn new(api_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn add_url(&self) -> String {
        format!("{}/api/v0/add?cid-version=1", self.api_url)
    }
}

#[async_trait]
impl BlobStore for KuboStore {
    async fn put(&self, bytes: &[u8]) -> StoreResult<String> {
        let part = multipart::Part::bytes(bytes.to_vec()).file_name("module.wasm");
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.add_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply: AddReply = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidReply(e.to_string()))?;

        if reply.hash.is_empty() {
            return Err(StoreError::InvalidReply("empty Hash field".into()));
        }
        Ok(reply.hash)
    }

    fn name(&self) -> &'static str {
        "kubo"
    }
}
