//! `ManifestBuilder`: accumulates pipeline records into a [`Manifest`]
//! (spec.md §4.5), and [`ManifestBlockSink`], the sink form of the same
//! accumulation for pipelines that build a manifest as their only output.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::Mutex;
use tapioca_manifest::{BlockInfo, FileInfoBuilder, Manifest};

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockSink;

/// Buffers every block observed for a file, keyed by `block_id` so that
/// blocks arriving out of order (the pipeline fans work across many
/// concurrent tasks) still assemble into the correct sequence at
/// `finish()` time.
struct FileAccumulator {
    blocks: BTreeMap<u64, (BlockInfo, Option<Bytes>)>,
}

/// Accumulates observed blocks into per-file sequences and, on `finish`,
/// produces a [`Manifest`]. Not a [`BlockSink`] itself — see
/// [`crate::source::ManifestBuilderBlockSource`] for the tee that drives
/// this from a source, and [`ManifestBlockSink`] for the sink that drives
/// it from a sink fan-out.
pub struct ManifestBuilder {
    max_block_size: u32,
    files: BTreeMap<String, FileAccumulator>,
}

impl ManifestBuilder {
    pub fn new(max_block_size: u32) -> Self {
        Self { max_block_size, files: BTreeMap::new() }
    }

    /// Record one block. Requires `hash` and `size`; `block` bytes are
    /// optional but, if present for some blocks of a file and absent for
    /// others, the resulting file hash falls back to the
    /// bytes-incomplete case documented on [`tapioca_manifest::FileInfoBuilder`].
    pub fn observe(&mut self, record: &BlockRecord) {
        let (Some(hash), Some(size)) = (record.hash, record.size) else {
            return;
        };
        let accumulator = self
            .files
            .entry(record.file.clone())
            .or_insert_with(|| FileAccumulator { blocks: BTreeMap::new() });
        accumulator
            .blocks
            .insert(record.block_id, (BlockInfo::new(hash, size), record.block.clone()));
    }

    /// Finalize into a [`Manifest`]. Blocks within a file are fed to its
    /// [`FileInfoBuilder`] in ascending `block_id` order regardless of
    /// observation order.
    pub fn finish(self) -> Result<Manifest> {
        let mut manifest = Manifest::new(self.max_block_size)?;
        for (path, accumulator) in self.files {
            let mut builder = FileInfoBuilder::new(path);
            for (_, (info, bytes)) in accumulator.blocks {
                builder.append(info, bytes.as_deref());
            }
            manifest.add_file(builder.build())?;
        }
        Ok(manifest)
    }
}

/// A [`BlockSink`] wrapper around a shared [`ManifestBuilder`], for
/// pipelines whose only output is the manifest itself (e.g. a dry-run scan
/// that reports what *would* be uploaded without writing any blocks).
pub struct ManifestBlockSink {
    builder: Mutex<ManifestBuilder>,
}

impl ManifestBlockSink {
    pub fn new(max_block_size: u32) -> Self {
        Self { builder: Mutex::new(ManifestBuilder::new(max_block_size)) }
    }

    pub fn finish(self) -> Result<Manifest> {
        self.builder.into_inner().finish()
    }
}

#[async_trait::async_trait]
impl BlockSink for ManifestBlockSink {
    async fn write(&self, record: &BlockRecord) -> Result<()> {
        if record.hash.is_none() || record.size.is_none() {
            return Err(Error::Sink(format!(
                "ManifestBlockSink requires hash and size for {:?} block {}",
                record.file, record.block_id
            )));
        }
        self.builder.lock().observe(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_manifest_from_out_of_order_blocks() {
        let sink = ManifestBlockSink::new(8);
        let data0 = b"AAAAAAAA";
        let data1 = b"BB";
        let r0 = BlockRecord::with_bytes("f", 0, Bytes::from_static(data0)).with_hash(tapioca_hash::hash_block(data0));
        let r1 = BlockRecord::with_bytes("f", 1, Bytes::from_static(data1)).with_hash(tapioca_hash::hash_block(data1));

        sink.write(&r1).await.unwrap();
        sink.write(&r0).await.unwrap();

        let manifest = sink.finish().unwrap();
        let file = manifest.file("f").unwrap();
        assert_eq!(file.blocks.len(), 2);
        assert_eq!(file.size, 10);
        assert_eq!(file.hash, tapioca_hash::hash_block(b"AAAAAAAABB"));
    }
}
