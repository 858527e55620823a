//! `BlockRecord`: the unit flowing through the pipeline (spec.md §3)

use bytes::Bytes;
use tapioca_hash::BlockHash;

/// A single block as it flows through the pipeline. Treated as a value:
/// "updating" a record produces a new record with the changed fields
/// (spec.md §3), which Rust gives us for free via struct-update syntax
/// (`BlockRecord { hash: Some(h), ..record }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// The logical path this block belongs to, forward-slash normalized.
    pub file: String,
    /// Zero-based index of this block within its file.
    pub block_id: u64,
    /// SHA-512 fingerprint of the raw (pre-compression) block bytes.
    pub hash: Option<BlockHash>,
    /// Byte length of `block`. For `GzipBlockProcessor` output this is the
    /// *compressed* length, a deliberate deviation from `size == len(block)`
    /// documented in spec.md §4.3 — the manifest never sees post-compression
    /// records.
    pub size: Option<u32>,
    /// The raw or transformed bytes, if present.
    pub block: Option<Bytes>,
}

impl BlockRecord {
    pub fn new(file: impl Into<String>, block_id: u64) -> Self {
        Self {
            file: file.into(),
            block_id,
            hash: None,
            size: None,
            block: None,
        }
    }

    pub fn with_bytes(file: impl Into<String>, block_id: u64, bytes: Bytes) -> Self {
        let size = bytes.len() as u32;
        Self {
            file: file.into(),
            block_id,
            hash: None,
            size: Some(size),
            block: Some(bytes),
        }
    }

    pub fn with_hash(mut self, hash: BlockHash) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_block(mut self, block: Bytes) -> Self {
        self.block = Some(block);
        self
    }

    pub fn fingerprint(&self) -> Option<String> {
        self.hash
            .as_ref()
            .map(|hash| tapioca_hash::fingerprint(hash))
    }
}
