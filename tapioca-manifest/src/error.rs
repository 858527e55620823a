//! Error types for manifest construction, serialization, and verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode manifest: {0}")]
    Encode(#[from] bincode::Error),

    #[error("failed to encode manifest as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "block {block_id} of file {path:?} is {size} bytes, exceeding max_block_size {max}"
    )]
    BlockTooLarge {
        path: String,
        block_id: u64,
        size: u32,
        max: u32,
    },

    #[error("non-terminal block {block_id} of file {path:?} is {size} bytes, short of max_block_size {max}")]
    ShortNonTerminalBlock {
        path: String,
        block_id: u64,
        size: u32,
        max: u32,
    },

    #[error("block registry collision for one hash with differing sizes {0} != {1}")]
    BlockSizeCollision(u32, u32),

    #[error("manifest build() called with {0} unreconciled block(s) still pending in accumulators")]
    UnreconciledAccumulator(usize),

    #[error("not enough free space to preallocate manifest: need {needed} bytes, have {free} available")]
    InsufficientSpace { needed: u64, free: u64 },

    #[error("manifest declares block size {0}, which is not a power of two")]
    BlockSizeNotPowerOfTwo(u32),

    #[error("manifest declares block size {0}, exceeding the 16 MiB maximum")]
    BlockSizeTooLarge(u32),

    #[error("path {0:?} is not normalized (contains '.' or '..' segments)")]
    UnnormalizedPath(String),
}

pub type Result<T> = std::result::Result<T, Error>;
