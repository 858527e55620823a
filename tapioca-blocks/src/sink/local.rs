//! `LocalStorageBlockSink`: writes each block to a content-addressed path
//! on local disk, `{root}/{fingerprint}` (spec.md §6: "no directory
//! fan-out; the keyspace is flat").

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::record::BlockRecord;

use super::BlockSink;

/// Stores blocks as individual files directly under `root`, one per
/// fingerprint, matching the flat content-addressed keyspace spec.md §6
/// defines for block storage.
pub struct LocalStorageBlockSink {
    root: PathBuf,
}

impl LocalStorageBlockSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn block_path(&self, fingerprint: &str) -> PathBuf {
        self.root.join(fingerprint)
    }
}

#[async_trait::async_trait]
impl BlockSink for LocalStorageBlockSink {
    async fn open(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn write(&self, record: &BlockRecord) -> Result<()> {
        let Some(fingerprint) = record.fingerprint() else {
            return Err(Error::Sink(format!(
                "LocalStorageBlockSink requires a hash for {:?} block {}",
                record.file, record.block_id
            )));
        };
        let Some(bytes) = record.block.as_ref() else {
            return Err(Error::Sink(format!(
                "LocalStorageBlockSink requires bytes for {:?} block {}",
                record.file, record.block_id
            )));
        };

        let path = self.block_path(&fingerprint);
        if path.exists() {
            return Ok(());
        }
        let tmp_path = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}

pub fn block_exists(root: &Path, fingerprint: &str) -> bool {
    root.join(fingerprint).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn writes_block_directly_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalStorageBlockSink::new(dir.path());
        sink.open().await.unwrap();

        let data = b"payload";
        let hash = tapioca_hash::hash_block(data);
        let record = BlockRecord::new("f", 0).with_hash(hash).with_block(Bytes::from_static(data));
        sink.write(&record).await.unwrap();

        let fingerprint = record.fingerprint().unwrap();
        assert!(block_exists(dir.path(), &fingerprint));
    }

    #[tokio::test]
    async fn rewriting_the_same_block_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalStorageBlockSink::new(dir.path());
        sink.open().await.unwrap();

        let data = b"payload";
        let hash = tapioca_hash::hash_block(data);
        let record = BlockRecord::new("f", 0).with_hash(hash).with_block(Bytes::from_static(data));
        sink.write(&record).await.unwrap();
        sink.write(&record).await.unwrap();
    }
}
