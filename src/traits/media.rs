//! Media download abstraction used for content hashing.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::NetworkError;

/// Fetches raw media bytes (stickers) by URL.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, NetworkError>;
}
