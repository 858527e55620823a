//! `BlockSink`: a scoped, concurrent consumer of `BlockRecord`s (spec.md §4.4)

mod diagnostic;
mod installation;
mod local;
mod manifest;
mod object;

pub use diagnostic::{ConsoleBlockSink, NullBlockSink};
pub use installation::InstallationBlockSink;
pub use local::LocalStorageBlockSink;
pub use manifest::{ManifestBlockSink, ManifestBuilder};
pub use object::{BlockBucket, InMemoryBlockBucket, ObjectStorageBlockSink};

use crate::error::Result;
use crate::record::BlockRecord;

/// A scoped, many-writer consumer of blocks. The pipeline fans a single
/// record stream out to every configured sink concurrently (spec.md §4.4,
/// §5); sinks must therefore be safe to call from many tasks at once,
/// hence `Send + Sync` and `&self` receivers.
#[async_trait::async_trait]
pub trait BlockSink: Send + Sync {
    /// Idempotent acquisition of underlying resources.
    async fn open(&self) -> Result<()> {
        Ok(())
    }

    /// Idempotent release/flush of underlying resources.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Consume one record. A write failure here is logged and the pipeline
    /// continues processing other records (spec.md §6); it does not abort
    /// the run unless the sink itself chooses to surface an `Invariant`
    /// error.
    async fn write(&self, record: &BlockRecord) -> Result<()>;
}
