//! Block hashing, fingerprint encoding, and build-key derivation.
//!
//! This crate is the single source of truth for the two digest families
//! Tapioca uses: SHA-512 over block/file bytes (content addressing) and
//! BLAKE2b over `(project, branch, build)` triples (build identity).

mod build_key;
mod error;
mod fingerprint;

pub use build_key::{BUILD_KEY_LEN, BuildKey, block_reference_key, build_key};
pub use error::{Error, Result};
pub use fingerprint::{BlockHash, DIGEST_LEN, StreamingHasher, defingerprint, empty_digest, fingerprint, hash_block};
