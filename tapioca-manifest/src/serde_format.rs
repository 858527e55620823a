//! On-disk manifest serialization
//!
//! The canonical on-wire form is raw binary (`bincode`). JSON and a textual
//! debug form are emitted only for human inspection and are never
//! re-ingested (spec.md §6).

use serde::{Deserialize, Serialize};
use tapioca_hash::BlockHash;

use crate::block::BlockInfo;
use crate::error::Result;
use crate::file::FileInfo;
use crate::manifest::Manifest;
use crate::registry::BlockRegistry;
use crate::trie::{FileLeaf, ItemEntry, ItemTrie, walk_entries};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedBlock {
    #[serde(with = "crate::block::serde_bytes_array")]
    hash: BlockHash,
    /// Omitting `size` implies `max_block_size` — the common case for every
    /// non-terminal block (spec.md §4.5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedManifest {
    max_block_size: u32,
    blocks: Vec<SerializedBlock>,
    items: Vec<ItemEntry>,
}

fn to_serialized(manifest: &Manifest) -> Result<SerializedManifest> {
    let mut registry = BlockRegistry::new();
    let mut trie = ItemTrie::new();

    for file in manifest.files() {
        let mut block_ids = Vec::with_capacity(file.blocks.len());
        for block in &file.blocks {
            block_ids.push(registry.register(*block)?);
        }
        trie.add(
            &file.path,
            FileLeaf {
                block_ids,
                hash: file.hash,
                size: file.size,
            },
        )?;
    }

    let max = manifest.max_block_size();
    let blocks = registry
        .into_blocks()
        .into_iter()
        .map(|b| SerializedBlock {
            hash: b.hash,
            size: if b.size == max { None } else { Some(b.size) },
        })
        .collect();

    Ok(SerializedManifest {
        max_block_size: max,
        blocks,
        items: trie.into_entries(),
    })
}

fn from_serialized(serialized: SerializedManifest) -> Result<Manifest> {
    let block_infos: Vec<BlockInfo> = serialized
        .blocks
        .into_iter()
        .map(|b| BlockInfo::new(b.hash, b.size.unwrap_or(serialized.max_block_size)))
        .collect();

    let mut manifest = Manifest::new(serialized.max_block_size)?;
    for (path, leaf) in walk_entries(&serialized.items) {
        let blocks = leaf
            .block_ids
            .iter()
            .map(|&id| block_infos[id as usize])
            .collect();
        manifest.add_file(FileInfo {
            path,
            blocks,
            hash: leaf.hash,
            size: leaf.size,
        })?;
    }
    Ok(manifest)
}

/// Encode a manifest in its canonical binary form.
pub fn to_bytes(manifest: &Manifest) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&to_serialized(manifest)?)?)
}

/// Decode a manifest from its canonical binary form.
pub fn from_bytes(bytes: &[u8]) -> Result<Manifest> {
    let serialized: SerializedManifest = bincode::deserialize(bytes)?;
    from_serialized(serialized)
}

/// Render a manifest as JSON for human inspection. Not re-ingested
/// (spec.md §6) — there is deliberately no `from_json`.
pub fn to_json(manifest: &Manifest) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_serialized(manifest)?)?)
}

/// Render a manifest as a textual debug dump for human inspection.
pub fn to_text(manifest: &Manifest) -> String {
    let mut out = format!("max_block_size: {}\n", manifest.max_block_size());
    for file in manifest.files() {
        out.push_str(&format!(
            "{} ({} bytes, {} blocks, hash {})\n",
            file.path,
            file.size,
            file.blocks.len(),
            tapioca_hash::fingerprint(&file.hash)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tapioca_hash::hash_block;

    fn sample_manifest() -> Manifest {
        let mut m = Manifest::new(8).unwrap();
        let shared = BlockInfo::new(hash_block(b"shared!!"), 8);
        let unique_a = BlockInfo::new(hash_block(b"aaaaaaaa"), 8);
        let unique_b = BlockInfo::new(hash_block(b"bb"), 2);
        m.add_file(FileInfo {
            path: "dir/a.bin".into(),
            blocks: vec![unique_a, shared],
            hash: hash_block(b"aaaaaaaashared!!"),
            size: 16,
        })
        .unwrap();
        m.add_file(FileInfo {
            path: "dir/b.bin".into(),
            blocks: vec![shared, unique_b],
            hash: hash_block(b"shared!!bb"),
            size: 10,
        })
        .unwrap();
        m
    }

    // Invariant 4 from spec.md §8.
    #[test]
    fn binary_round_trip_preserves_manifest() {
        let manifest = sample_manifest();
        let bytes = to_bytes(&manifest).unwrap();
        let back = from_bytes(&bytes).unwrap();
        assert_eq!(manifest, back);
    }

    #[test]
    fn shared_blocks_are_stored_once() {
        let manifest = sample_manifest();
        let serialized = to_serialized(&manifest).unwrap();
        // Two files, 2 blocks each, one shared -> 3 distinct blocks.
        assert_eq!(serialized.blocks.len(), 3);
    }

    #[test]
    fn json_rendering_does_not_error() {
        let manifest = sample_manifest();
        let json = to_json(&manifest).unwrap();
        assert!(json.contains("max_block_size"));
    }

    #[test]
    fn text_rendering_lists_every_file() {
        let manifest = sample_manifest();
        let text = to_text(&manifest);
        assert!(text.contains("dir/a.bin"));
        assert!(text.contains("dir/b.bin"));
    }
}
