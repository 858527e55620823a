//! Compression processors (spec.md §4.3). Compression runs *after*
//! hashing, never before: `record.hash` always refers to the raw,
//! pre-compression bytes so that two identically-hashed blocks dedup
//! regardless of which compression level produced their stored bytes.

use bytes::Bytes;
use flate2::Compression;
use flate2::read::{GzDecoder, GzEncoder};
use std::io::Read;

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockProcessor;

/// Gzip-compresses `record.block` in place, updating `size` to the
/// compressed length (spec.md §3: deliberate `size != len(block)` case for
/// stored/transfer representations).
pub struct GzipBlockProcessor {
    level: Compression,
}

impl GzipBlockProcessor {
    pub fn new() -> Self {
        Self { level: Compression::default() }
    }

    pub fn with_level(level: u32) -> Self {
        Self { level: Compression::new(level) }
    }
}

impl Default for GzipBlockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BlockProcessor for GzipBlockProcessor {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>> {
        let Some(bytes) = record.block.clone() else {
            return Err(Error::Processor(format!(
                "GzipBlockProcessor requires bytes for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let level = self.level;
        let compressed = tokio::task::spawn_blocking(move || {
            let mut encoder = GzEncoder::new(bytes.as_ref(), level);
            let mut out = Vec::new();
            encoder.read_to_end(&mut out).map(|_| out)
        })
        .await
        .map_err(|e| Error::Processor(format!("gzip task panicked: {e}")))?
        .map_err(|e| Error::Processor(format!("gzip compression failed: {e}")))?;

        let compressed = Bytes::from(compressed);
        let size = compressed.len() as u32;
        Ok(Some(record.with_block(compressed).with_size(size)))
    }
}

/// Gzip-decompresses `record.block` in place. The inverse of
/// [`GzipBlockProcessor`], used on the read path before validation.
pub struct GunzipBlockProcessor;

impl GunzipBlockProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GunzipBlockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BlockProcessor for GunzipBlockProcessor {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>> {
        let Some(bytes) = record.block.clone() else {
            return Err(Error::Processor(format!(
                "GunzipBlockProcessor requires bytes for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let decompressed = tokio::task::spawn_blocking(move || {
            let mut decoder = GzDecoder::new(bytes.as_ref());
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).map(|_| out)
        })
        .await
        .map_err(|e| Error::Processor(format!("gunzip task panicked: {e}")))?
        .map_err(|e| Error::Processor(format!("gunzip decompression failed: {e}")))?;

        let decompressed = Bytes::from(decompressed);
        let size = decompressed.len() as u32;
        Ok(Some(record.with_block(decompressed).with_size(size)))
    }
}
