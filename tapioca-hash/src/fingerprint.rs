//! Block/file hashing and URL-safe fingerprint encoding
//!
//! Block hash = SHA-512 over raw block bytes. File hash = SHA-512 over the
//! concatenation of raw block bytes in file order (streamed, not a hash of
//! hashes). The fingerprint is base64url of the digest with padding
//! stripped; it is the only form used for disk filenames, object-store
//! paths, and log messages.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use digest::Digest;
use sha2::Sha512;

use crate::error::{Error, Result};

/// Width of a SHA-512 digest in bytes.
pub const DIGEST_LEN: usize = 64;

/// A SHA-512 digest, stack-allocated so block/file hashes are cheap to copy
/// and hash themselves (used as map keys throughout the pipeline).
pub type BlockHash = [u8; DIGEST_LEN];

/// Hash a single block's raw bytes.
pub fn hash_block(block: &[u8]) -> BlockHash {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha512::digest(block));
    out
}

/// The SHA-512 digest of the empty byte string. Used as the sentinel file
/// hash when a `FileInfoBuilder` never observed block bytes (spec.md §4.5).
pub fn empty_digest() -> BlockHash {
    hash_block(&[])
}

/// Incremental SHA-512 hasher for file-level hashes, updated with each
/// block's raw bytes in file order.
#[derive(Clone, Default)]
pub struct StreamingHasher(Sha512);

impl StreamingHasher {
    pub fn new() -> Self {
        Self(Sha512::new())
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    pub fn finalize(self) -> BlockHash {
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&self.0.finalize());
        out
    }
}

/// Encode a digest as a URL-safe, unpadded base64 fingerprint.
///
/// This is the only encoding used for disk filenames, object-store paths,
/// and log messages (spec.md §4.1).
pub fn fingerprint(hash: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(hash)
}

/// Decode a fingerprint back into raw digest bytes.
pub fn defingerprint(fp: &str) -> Result<BlockHash> {
    let bytes = URL_SAFE_NO_PAD.decode(fp)?;
    if bytes.len() != DIGEST_LEN {
        return Err(Error::WrongDigestLength(bytes.len(), DIGEST_LEN));
    }
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}
