//! Fetching blocks by fingerprint from a remote store, for the download /
//! deployment side of the pipeline where a [`crate::source::ManifestBlockSource`]
//! or [`crate::source::ManifestDiffBlockSource`] only carries metadata
//! (spec.md §4.3, §4.8).

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tapioca_hash::BlockHash;

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockProcessor;

/// Resolves a block's raw bytes given its fingerprint. Implementations
/// decide where "remote" means: an HTTP CDN, local disk, or a test double.
#[async_trait::async_trait]
pub trait BlockFetcher: Send + Sync {
    async fn fetch(&self, hash: &BlockHash) -> Result<Bytes>;
}

/// Fetches a block over HTTP by its base64url fingerprint, joined onto a
/// base URL as `{base_url}/{fingerprint}` (mirrors the CDN path layout
/// `ngdp-cdn` uses for content-addressed archives in the teacher repo).
pub struct HttpBlockFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBlockFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }
}

#[async_trait::async_trait]
impl BlockFetcher for HttpBlockFetcher {
    async fn fetch(&self, hash: &BlockHash) -> Result<Bytes> {
        let fingerprint = tapioca_hash::fingerprint(hash);
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), fingerprint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Fetch { fingerprint: fingerprint.clone(), message: e.to_string() })?;
        if !response.status().is_success() {
            return Err(Error::Fetch {
                fingerprint,
                message: format!("unexpected status {}", response.status()),
            });
        }
        response
            .bytes()
            .await
            .map_err(|e| Error::Fetch { fingerprint, message: e.to_string() })
    }
}

/// Wraps another fetcher with an in-memory cache keyed by hash, so repeat
/// fetches of a popular block (shared across many files/builds) only hit
/// the network once per process lifetime.
pub struct CachedBlockFetcher<F> {
    inner: F,
    cache: DashMap<BlockHash, Bytes>,
}

impl<F: BlockFetcher> CachedBlockFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self { inner, cache: DashMap::new() }
    }
}

#[async_trait::async_trait]
impl<F: BlockFetcher> BlockFetcher for CachedBlockFetcher<F> {
    async fn fetch(&self, hash: &BlockHash) -> Result<Bytes> {
        if let Some(cached) = self.cache.get(hash) {
            return Ok(cached.clone());
        }
        let bytes = self.inner.fetch(hash).await?;
        self.cache.insert(*hash, bytes.clone());
        Ok(bytes)
    }
}

#[cfg(test)]
mod http_fetcher_tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_block_bytes_by_fingerprint_path() {
        let server = MockServer::start().await;
        let hash = tapioca_hash::hash_block(b"payload");
        let fingerprint = tapioca_hash::fingerprint(&hash);

        Mock::given(method("GET"))
            .and(path(format!("/{fingerprint}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
            .mount(&server)
            .await;

        let fetcher = HttpBlockFetcher::new(server.uri());
        let bytes = fetcher.fetch(&hash).await.unwrap();
        assert_eq!(&bytes[..], b"payload");
    }

    #[tokio::test]
    async fn propagates_non_success_status_as_fetch_error() {
        let server = MockServer::start().await;
        let hash = tapioca_hash::hash_block(b"missing");
        let fingerprint = tapioca_hash::fingerprint(&hash);

        Mock::given(method("GET"))
            .and(path(format!("/{fingerprint}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpBlockFetcher::new(server.uri());
        let err = fetcher.fetch(&hash).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}

/// Adapts a [`BlockFetcher`] into a [`BlockProcessor`]: fills `record.block`
/// from `record.hash` for records that arrived without bytes.
pub struct FetchBlockProcessor {
    fetcher: Arc<dyn BlockFetcher>,
}

impl FetchBlockProcessor {
    pub fn new(fetcher: Arc<dyn BlockFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl BlockProcessor for FetchBlockProcessor {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>> {
        if record.block.is_some() {
            return Ok(Some(record));
        }
        let Some(hash) = record.hash else {
            return Err(Error::Processor(format!(
                "FetchBlockProcessor requires a hash for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let bytes = self.fetcher.fetch(&hash).await?;
        Ok(Some(record.with_block(bytes)))
    }
}
