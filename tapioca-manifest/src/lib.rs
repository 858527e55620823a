//! The content-addressed manifest model: files, blocks, diffs, and
//! serialization.

mod block;
mod diff;
mod error;
mod file;
mod manifest;
mod registry;
mod serde_format;
mod trie;

pub use block::BlockInfo;
pub use diff::{FileDiff, ManifestDiff};
pub use error::{Error, Result};
pub use file::{FileInfoBuilder, normalize_path};
pub use manifest::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, Manifest};
pub use registry::BlockRegistry;
pub use serde_format::{from_bytes, to_bytes, to_json, to_text};
pub use trie::{FileLeaf, ItemEntry, ItemTrie, walk_entries};

// Re-exported for crates that need to build `FileInfo` values directly
// (e.g. `tapioca-blocks`'s `ManifestBlockSink`).
pub use file::FileInfo;
