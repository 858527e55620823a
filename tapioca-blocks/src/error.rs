//! Error kinds for the block pipeline (spec.md §7)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Cannot enumerate or open a source's root — fatal to the pipeline run.
    #[error("source error: {0}")]
    Source(String),

    /// Per-block read failure; drops the affected block, pipeline continues.
    #[error("block io error reading {file:?} block {block_id}: {source}")]
    BlockIo {
        file: String,
        block_id: u64,
        #[source]
        source: std::io::Error,
    },

    /// A processor raised or returned garbage; drops the affected block.
    #[error("processor error: {0}")]
    Processor(String),

    /// Sink write failed; logged, no retry, pipeline continues.
    #[error("sink error: {0}")]
    Sink(String),

    /// Validator detected corruption; drops.
    #[error("hash mismatch for {file:?} block {block_id}")]
    HashMismatch { file: String, block_id: u64 },

    /// Fetcher could not obtain bytes; drops (caller retries at a higher level).
    #[error("fetch error for block {fingerprint}: {message}")]
    Fetch { fingerprint: String, message: String },

    /// An asserted invariant was violated — fatal.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("manifest error: {0}")]
    Manifest(#[from] tapioca_manifest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
