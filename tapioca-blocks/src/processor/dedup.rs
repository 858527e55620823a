//! `DedupBlockProcessor`: drops blocks whose hash the pipeline has already
//! seen this run (spec.md §4.3, §4.4 "dedup before sink").

use dashmap::DashSet;

use tapioca_hash::BlockHash;

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockProcessor;

/// Tracks hashes seen so far across concurrent pipeline workers and drops
/// every record after the first carrying a given hash. Requires `hash` to
/// already be set (run after [`super::BlockHasher`]).
pub struct DedupBlockProcessor {
    seen: DashSet<BlockHash>,
}

impl DedupBlockProcessor {
    pub fn new() -> Self {
        Self { seen: DashSet::new() }
    }

    /// Pre-seed the dedup set, e.g. with blocks already known to a
    /// [`crate::sink::BlockBucket`] from a previous run.
    pub fn seeded(hashes: impl IntoIterator<Item = BlockHash>) -> Self {
        let seen = DashSet::new();
        for hash in hashes {
            seen.insert(hash);
        }
        Self { seen }
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Default for DedupBlockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BlockProcessor for DedupBlockProcessor {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>> {
        let Some(hash) = record.hash else {
            return Err(Error::Processor(format!(
                "DedupBlockProcessor requires a hash, got none for {:?} block {}",
                record.file, record.block_id
            )));
        };
        if !self.seen.insert(hash) {
            return Ok(None);
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn drops_second_occurrence_of_a_hash() {
        let dedup = DedupBlockProcessor::new();
        let hash = [7u8; 64];
        let r1 = BlockRecord::new("a", 0).with_hash(hash).with_block(Bytes::from_static(b"x"));
        let r2 = BlockRecord::new("b", 0).with_hash(hash).with_block(Bytes::from_static(b"x"));

        assert!(dedup.process(r1).await.unwrap().is_some());
        assert!(dedup.process(r2).await.unwrap().is_none());
        assert_eq!(dedup.seen_count(), 1);
    }
}
