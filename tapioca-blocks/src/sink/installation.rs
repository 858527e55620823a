//! `InstallationBlockSink`: writes blocks directly into their final
//! position within a pre-allocated installation directory (spec.md §4.4,
//! §4.7.1 "preallocate"), the terminal step of a deploy/sync pipeline.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use tapioca_manifest::Manifest;

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockSink;

/// Per-file byte offset of each block, precomputed from a manifest's block
/// size sequence so a sink write never needs to touch sibling blocks.
struct FileLayout {
    offsets: Vec<u64>,
}

/// Writes each record's bytes to `{root}/{file}` at the offset implied by
/// the target manifest's block layout. The target file must already exist
/// at its final size (see [`Manifest::preallocate`]); this sink performs
/// positioned writes only, never appends or truncates.
pub struct InstallationBlockSink {
    root: PathBuf,
    layouts: HashMap<String, FileLayout>,
}

impl InstallationBlockSink {
    pub fn new(root: impl Into<PathBuf>, manifest: &Manifest) -> Self {
        let mut layouts = HashMap::new();
        for file in manifest.files() {
            let mut offsets = Vec::with_capacity(file.blocks.len());
            let mut offset = 0u64;
            for block in &file.blocks {
                offsets.push(offset);
                offset += u64::from(block.size);
            }
            layouts.insert(file.path.clone(), FileLayout { offsets });
        }
        Self { root: root.into(), layouts }
    }

    fn target_path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

#[async_trait::async_trait]
impl BlockSink for InstallationBlockSink {
    async fn open(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn write(&self, record: &BlockRecord) -> Result<()> {
        let Some(bytes) = record.block.as_ref() else {
            return Err(Error::Sink(format!(
                "InstallationBlockSink requires bytes for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let layout = self.layouts.get(&record.file).ok_or_else(|| {
            Error::Sink(format!("no manifest layout for file {:?}", record.file))
        })?;
        let offset = *layout.offsets.get(record.block_id as usize).ok_or_else(|| {
            Error::Sink(format!(
                "block {} out of range for file {:?} ({} blocks)",
                record.block_id,
                record.file,
                layout.offsets.len()
            ))
        })?;

        let path = self.target_path(&record.file);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new().write(true).open(&path).await?;
        file.seek(std::io::SeekFrom::Start(offset)).await?;
        file.write_all(bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tapioca_manifest::{BlockInfo, FileInfo};

    fn manifest_with_one_file(block_sizes: &[u32]) -> Manifest {
        let mut m = Manifest::new(8).unwrap();
        let blocks: Vec<BlockInfo> = block_sizes.iter().map(|&s| BlockInfo::new([0u8; 64], s)).collect();
        let size = blocks.iter().map(|b| u64::from(b.size)).sum();
        m.add_file(FileInfo { path: "f.bin".to_string(), blocks, hash: [0u8; 64], size })
            .unwrap();
        m
    }

    #[tokio::test]
    async fn writes_each_block_at_its_offset() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest_with_one_file(&[4, 4]);
        manifest.preallocate(dir.path()).unwrap();

        let sink = InstallationBlockSink::new(dir.path(), &manifest);
        sink.open().await.unwrap();

        let r0 = BlockRecord::new("f.bin", 0).with_block(Bytes::from_static(b"AAAA"));
        let r1 = BlockRecord::new("f.bin", 1).with_block(Bytes::from_static(b"BBBB"));
        sink.write(&r1).await.unwrap();
        sink.write(&r0).await.unwrap();

        let contents = std::fs::read(dir.path().join("f.bin")).unwrap();
        assert_eq!(&contents, b"AAAABBBB");
    }
}
