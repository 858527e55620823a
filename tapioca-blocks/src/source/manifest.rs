//! Sources that walk a [`Manifest`] or [`ManifestDiff`] instead of a
//! filesystem, emitting metadata-only records (hash + size, no bytes) for
//! a downstream [`crate::processor::BlockFetcher`] to fill in (spec.md
//! §4.2, §4.8 "deployment" flow).

use futures::stream::{self, StreamExt};
use tapioca_manifest::{Manifest, ManifestDiff};

use super::{BlockSource, RecordStream};
use crate::record::BlockRecord;

/// Walks every file and block in a manifest, in ascending `(file, block_id)`
/// order, regardless of whether the caller already has those blocks. Used
/// to republish or re-verify a complete build.
pub struct ManifestBlockSource {
    records: Vec<BlockRecord>,
}

impl ManifestBlockSource {
    pub fn new(manifest: &Manifest) -> Self {
        let mut records = Vec::new();
        for file in manifest.files() {
            for (id, block) in file.blocks.iter().enumerate() {
                records.push(
                    BlockRecord::new(file.path.clone(), id as u64)
                        .with_hash(block.hash)
                        .with_size(block.size),
                );
            }
        }
        Self { records }
    }
}

#[async_trait::async_trait]
impl BlockSource for ManifestBlockSource {
    fn produce(&mut self) -> RecordStream<'_> {
        stream::iter(std::mem::take(&mut self.records).into_iter().map(Ok)).boxed()
    }
}

/// Walks only the block positions a [`ManifestDiff`] marks as changed,
/// resolving their hash/size against the *remote* manifest (the one being
/// synced to) since `FileDiff` itself only carries hashes (spec.md §4.6).
/// This is the incremental-sync counterpart to [`ManifestBlockSource`].
pub struct ManifestDiffBlockSource {
    records: Vec<BlockRecord>,
}

impl ManifestDiffBlockSource {
    pub fn new(remote: &Manifest, diff: &ManifestDiff) -> Self {
        let mut records = Vec::new();
        for (path, file_diff) in &diff.changed_files {
            if file_diff.deleted {
                continue;
            }
            let Some(remote_file) = remote.file(path) else {
                continue;
            };
            for (&position, (_current_hash, remote_hash)) in &file_diff.changed_blocks {
                let Some(hash) = remote_hash else {
                    continue;
                };
                let Some(block) = remote_file.blocks.get(position as usize) else {
                    continue;
                };
                debug_assert_eq!(&block.hash, hash);
                records.push(
                    BlockRecord::new(path.clone(), position)
                        .with_hash(block.hash)
                        .with_size(block.size),
                );
            }
        }
        Self { records }
    }
}

#[async_trait::async_trait]
impl BlockSource for ManifestDiffBlockSource {
    fn produce(&mut self) -> RecordStream<'_> {
        stream::iter(std::mem::take(&mut self.records).into_iter().map(Ok)).boxed()
    }
}
