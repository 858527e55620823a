//! `BlockProcessor`: a pure(ish), composable transform applied to each
//! record as it flows through the pipeline (spec.md §4.3).

mod dedup;
mod fetch;
mod gzip;
mod hash;
mod validate;

pub use dedup::DedupBlockProcessor;
pub use fetch::{BlockFetcher, CachedBlockFetcher, FetchBlockProcessor, HttpBlockFetcher};
pub use gzip::{GunzipBlockProcessor, GzipBlockProcessor};
pub use hash::BlockHasher;
pub use validate::ValidateBlockProcessor;

use crate::error::Result;
use crate::record::BlockRecord;

/// Transforms, drops, or passes through a single [`BlockRecord`]. Returning
/// `Ok(None)` drops the record from the pipeline without failing it (e.g.
/// deduplication); returning `Err` marks it as a dropped-with-error block
/// that the pipeline logs and continues past (spec.md §4.3, §6).
#[async_trait::async_trait]
pub trait BlockProcessor: Send + Sync {
    async fn process(&self, record: BlockRecord) -> Result<Option<BlockRecord>>;
}

/// Runs a chain of processors in order, short-circuiting on the first one
/// that drops (`Ok(None)`) or fails the record.
pub async fn run_chain(
    processors: &[Box<dyn BlockProcessor>],
    mut record: BlockRecord,
) -> Result<Option<BlockRecord>> {
    for processor in processors {
        match processor.process(record).await? {
            Some(next) => record = next,
            None => return Ok(None),
        }
    }
    Ok(Some(record))
}
