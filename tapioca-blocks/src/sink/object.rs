//! `BlockBucket`: an abstraction over a content-addressed remote object
//! store (spec.md §4.4.1), and [`ObjectStorageBlockSink`], the sink that
//! writes pipeline records through one.

use dashmap::DashSet;

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockSink;

/// A remote content-addressed store keyed by fingerprint. Real
/// implementations wrap an object-storage SDK; [`InMemoryBlockBucket`] is
/// the in-process test double used by the pipeline's own test suite.
#[async_trait::async_trait]
pub trait BlockBucket: Send + Sync {
    async fn exists(&self, fingerprint: &str) -> Result<bool>;
    async fn put(&self, fingerprint: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes each record to a [`BlockBucket`], skipping ones the bucket
/// already has (spec.md §4.4.1: sinks check existence before uploading to
/// avoid redundant transfer of already-deduplicated blocks).
pub struct ObjectStorageBlockSink<B> {
    bucket: B,
}

impl<B: BlockBucket> ObjectStorageBlockSink<B> {
    pub fn new(bucket: B) -> Self {
        Self { bucket }
    }
}

#[async_trait::async_trait]
impl<B: BlockBucket> BlockSink for ObjectStorageBlockSink<B> {
    async fn write(&self, record: &BlockRecord) -> Result<()> {
        let Some(fingerprint) = record.fingerprint() else {
            return Err(Error::Sink(format!(
                "ObjectStorageBlockSink requires a hash for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let Some(bytes) = record.block.as_ref() else {
            return Err(Error::Sink(format!(
                "ObjectStorageBlockSink requires bytes for {:?} block {}",
                record.file, record.block_id
            )));
        };
        if self.bucket.exists(&fingerprint).await? {
            return Ok(());
        }
        self.bucket.put(&fingerprint, bytes).await
    }
}

/// In-process [`BlockBucket`] for tests: a concurrent set of fingerprints
/// known to be present, with no actual byte storage beyond membership.
#[derive(Default)]
pub struct InMemoryBlockBucket {
    present: DashSet<String>,
}

impl InMemoryBlockBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

#[async_trait::async_trait]
impl BlockBucket for InMemoryBlockBucket {
    async fn exists(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.present.contains(fingerprint))
    }

    async fn put(&self, fingerprint: &str, _bytes: &[u8]) -> Result<()> {
        self.present.insert(fingerprint.to_string());
        Ok(())
    }
}
