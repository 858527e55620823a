//! `BlockHasher`: computes the SHA-512 fingerprint of a block's raw bytes
//! (spec.md §4.3).

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockProcessor;

/// Fills in `record.hash` from `record.block`, overwriting any existing
/// hash. Used immediately after a source so every downstream processor can
/// rely on `hash` being present.
#[derive(Debug, Default)]
pub struct BlockHasher;

impl BlockHasher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl BlockProcessor for BlockHasher {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>> {
        let Some(bytes) = record.block.as_ref() else {
            return Err(Error::Processor(format!(
                "BlockHasher requires bytes, got none for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let hash = tapioca_hash::hash_block(bytes);
        Ok(Some(record.with_hash(hash)))
    }
}
