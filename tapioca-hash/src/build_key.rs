//! Build-key derivation
//!
//! A build key is an 8-byte BLAKE2b digest over the concatenation
//! `project|branch|build`. Collisions are treated as equal builds — this is
//! an accepted design trade-off for a 64-bit keyspace (spec.md §3).

use blake2::Blake2bVar;
use blake2::digest::{Update, VariableOutput};

/// Width of a build key in bytes.
pub const BUILD_KEY_LEN: usize = 8;

/// An 8-byte identifier for a `(project, branch, build)` triple.
pub type BuildKey = [u8; BUILD_KEY_LEN];

/// Derive the build key for a project/branch/build triple.
pub fn build_key(project: &str, branch: &str, build: &str) -> BuildKey {
    let mut hasher =
        Blake2bVar::new(BUILD_KEY_LEN).expect("BUILD_KEY_LEN is a valid blake2b output size");
    hasher.update(project.as_bytes());
    hasher.update(b"|");
    hasher.update(branch.as_bytes());
    hasher.update(b"|");
    hasher.update(build.as_bytes());
    let mut out = [0u8; BUILD_KEY_LEN];
    hasher
        .finalize_variable(&mut out)
        .expect("output buffer matches configured digest size");
    out
}

/// The composite secondary-index key `block_hash || build_key` used by the
/// build database's `build_blocks` table. Lexicographic ordering of this
/// concatenation groups all references to a given block hash adjacently
/// (spec.md §3).
pub fn block_reference_key(block_hash: &[u8], key: &BuildKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(block_hash.len() + BUILD_KEY_LEN);
    out.extend_from_slice(block_hash);
    out.extend_from_slice(key);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_key_is_deterministic() {
        let a = build_key("game", "release", "1.2.3");
        let b = build_key("game", "release", "1.2.3");
        assert_eq!(a, b);
    }

    #[test]
    fn different_triples_usually_differ() {
        let a = build_key("game", "release", "1.2.3");
        let b = build_key("game", "beta", "1.2.3");
        assert_ne!(a, b);
    }

    #[test]
    fn separator_prevents_trivial_concatenation_collisions() {
        // "ab|c" vs "a|bc" must not collide just because the raw
        // concatenation of project+branch is identical.
        let a = build_key("ab", "c", "x");
        let b = build_key("a", "bc", "x");
        assert_ne!(a, b);
    }

    #[test]
    fn block_reference_key_groups_by_hash_prefix() {
        let hash = [0xAAu8; 64];
        let key1 = build_key("p", "b", "1");
        let key2 = build_key("p", "b", "2");
        let ref1 = block_reference_key(&hash, &key1);
        let ref2 = block_reference_key(&hash, &key2);
        assert_eq!(&ref1[..64], &ref2[..64]);
        assert_ne!(ref1, ref2);
    }
}
