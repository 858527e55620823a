//! `ValidateBlockProcessor`: recomputes a block's hash from its bytes and
//! compares against the hash carried on the record, catching silent
//! corruption on the read path (spec.md §4.3, §6).

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockProcessor;

pub struct ValidateBlockProcessor;

impl ValidateBlockProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ValidateBlockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BlockProcessor for ValidateBlockProcessor {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>> {
        let Some(bytes) = record.block.as_ref() else {
            return Err(Error::Processor(format!(
                "ValidateBlockProcessor requires bytes for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let Some(expected) = record.hash else {
            return Err(Error::Processor(format!(
                "ValidateBlockProcessor requires a hash for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let actual = tapioca_hash::hash_block(bytes);
        if actual != expected {
            return Err(Error::HashMismatch {
                file: record.file,
                block_id: record.block_id,
            });
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn rejects_corrupted_bytes() {
        let validator = ValidateBlockProcessor::new();
        let good_hash = tapioca_hash::hash_block(b"original");
        let record = BlockRecord::new("f", 0)
            .with_hash(good_hash)
            .with_block(Bytes::from_static(b"tampered"));
        let result = validator.process(record).await;
        assert!(matches!(result, Err(Error::HashMismatch { .. })));
    }

    #[tokio::test]
    async fn accepts_matching_bytes() {
        let validator = ValidateBlockProcessor::new();
        let hash = tapioca_hash::hash_block(b"original");
        let record = BlockRecord::new("f", 0).with_hash(hash).with_block(Bytes::from_static(b"original"));
        assert!(validator.process(record).await.unwrap().is_some());
    }
}
