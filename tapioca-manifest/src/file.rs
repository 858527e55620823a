//! `FileInfo`: a file's path, ordered block sequence, whole-file hash, and size

use serde::{Deserialize, Serialize};
use tapioca_hash::{BlockHash, StreamingHasher, empty_digest};

use crate::block::BlockInfo;

/// A file within a manifest: its normalized forward-slash path, ordered
/// block sequence, whole-file SHA-512 hash, and total byte size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub blocks: Vec<BlockInfo>,
    #[serde(with = "crate::block::serde_bytes_array")]
    pub hash: BlockHash,
    pub size: u64,
}

/// Normalize a path to use forward slashes with no `.`/`..` segments,
/// mirroring the normalization `DirectorySource` and manifest
/// serialization both rely on (spec.md §3). `..` segments are dropped
/// rather than resolved upward, so a path can never normalize to
/// something outside the tree it started in.
pub fn normalize_path(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Incrementally builds a [`FileInfo`] as blocks arrive in increasing
/// `block_id` order. The file hash is a streaming SHA-512 update over raw
/// block bytes (spec.md §3); if no block delivered to this builder ever
/// carried bytes, the hash is left at the SHA-512 empty-digest sentinel
/// (Open Question (b), SPEC_FULL §9).
pub struct FileInfoBuilder {
    path: String,
    blocks: Vec<BlockInfo>,
    size: u64,
    hasher: StreamingHasher,
    saw_bytes: bool,
}

impl FileInfoBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            blocks: Vec::new(),
            size: 0,
            hasher: StreamingHasher::new(),
            saw_bytes: false,
        }
    }

    /// Append the next block in sequence. `bytes` is `None` when the source
    /// producing this builder never carried raw block data (e.g. a
    /// manifest-driven download pipeline before fetch completes).
    pub fn append(&mut self, info: BlockInfo, bytes: Option<&[u8]>) {
        self.size += u64::from(info.size);
        if let Some(bytes) = bytes {
            self.hasher.update(bytes);
            self.saw_bytes = true;
        }
        self.blocks.push(info);
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn build(self) -> FileInfo {
        let hash = if self.saw_bytes {
            self.hasher.finalize()
        } else {
            empty_digest()
        };
        FileInfo {
            path: self.path,
            blocks: self.blocks,
            hash,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tapioca_hash::hash_block;

    #[test]
    fn normalizes_backslashes_and_dot_segments() {
        assert_eq!(normalize_path("a/./b\\c"), "a/b/c");
        assert_eq!(normalize_path("/a/b/"), "a/b");
    }

    #[test]
    fn drops_parent_segments_instead_of_escaping() {
        assert_eq!(normalize_path("../../etc/cron.d/x"), "etc/cron.d/x");
        assert_eq!(normalize_path("a/../b"), "a/b");
    }

    #[test]
    fn streams_file_hash_from_block_bytes() {
        let data = b"0123456789abcdef";
        let (first, second) = data.split_at(8);
        let mut builder = FileInfoBuilder::new("dir/file.bin");
        builder.append(BlockInfo::new(hash_block(first), first.len() as u32), Some(first));
        builder.append(
            BlockInfo::new(hash_block(second), second.len() as u32),
            Some(second),
        );
        let info = builder.build();
        assert_eq!(info.hash, hash_block(data));
        assert_eq!(info.size, data.len() as u64);
        assert_eq!(info.path, "dir/file.bin");
    }

    #[test]
    fn falls_back_to_empty_digest_without_bytes() {
        let mut builder = FileInfoBuilder::new("f");
        builder.append(BlockInfo::new([1u8; 64], 4), None);
        let info = builder.build();
        assert_eq!(info.hash, tapioca_hash::empty_digest());
    }
}
