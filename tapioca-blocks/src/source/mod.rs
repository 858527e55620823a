//! `BlockSource`: a scoped, lazy producer of `BlockRecord`s (spec.md §4.2)

mod builder;
mod directory;
mod manifest;
mod memory;
mod zip;

pub use builder::ManifestBuilderBlockSource;
pub use directory::{DirectorySource, SymlinkPolicy};
pub use manifest::{ManifestBlockSource, ManifestDiffBlockSource};
pub use memory::InMemorySource;
pub use zip::ZipFileSource;

use futures::stream::BoxStream;

use crate::error::Result;
use crate::record::BlockRecord;

/// The stream type every source's `produce()` returns: a finite,
/// non-restartable sequence of blocks in deterministic order (spec.md
/// §4.2).
pub type RecordStream<'a> = BoxStream<'a, Result<BlockRecord>>;

/// A scoped resource producing blocks, with guaranteed release on all exit
/// paths via `open`/`close` (spec.md §4.2). Implementations that hold no
/// underlying handles (e.g. [`InMemorySource`]) can leave both as no-ops.
#[async_trait::async_trait]
pub trait BlockSource: Send {
    /// Idempotent acquisition of underlying handles (file, archive). Fails
    /// with a fatal `Error::Source` if the root/archive cannot be opened at
    /// all (spec.md §4.2).
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Idempotent release of underlying handles.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Produce the block stream. Per-entry I/O failures surface as `Err`
    /// items within the stream (so the pipeline can drop just that block
    /// and continue); only `open()` failures are pipeline-fatal.
    fn produce(&mut self) -> RecordStream<'_>;
}

#[async_trait::async_trait]
impl BlockSource for Box<dyn BlockSource> {
    async fn open(&mut self) -> Result<()> {
        (**self).open().await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }

    fn produce(&mut self) -> RecordStream<'_> {
        (**self).produce()
    }
}
