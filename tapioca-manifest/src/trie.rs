//! `ItemTrie`: builds the path trie used by manifest serialization so
//! siblings sharing a path prefix share trie nodes. Built top-down only —
//! no parent back-references (spec.md §9).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tapioca_hash::BlockHash;

use crate::error::{Error, Result};
use crate::file::normalize_path;

/// Leaf payload for a file entry in the serialized trie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLeaf {
    pub block_ids: Vec<u32>,
    #[serde(with = "crate::block::serde_bytes_array")]
    pub hash: BlockHash,
    pub size: u64,
}

/// One entry in the serialized item trie: a path segment name, optional
/// subdirectory children, and an optional file leaf. An entry with
/// `file: None` is a directory; one with `file: Some(_)` is a file
/// (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileLeaf>,
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
    file: Option<FileLeaf>,
}

impl Node {
    fn into_entry(self, name: String) -> ItemEntry {
        let children = self
            .children
            .into_iter()
            .map(|(child_name, child)| child.into_entry(child_name))
            .collect();
        ItemEntry {
            name,
            children,
            file: self.file,
        }
    }
}

/// Builder that accumulates normalized file paths into a trie, top-down.
#[derive(Default)]
pub struct ItemTrie {
    roots: BTreeMap<String, Node>,
}

impl ItemTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file's leaf payload at a normalized path.
    pub fn add(&mut self, path: &str, leaf: FileLeaf) -> Result<()> {
        let norm = normalize_path(path);
        if norm.is_empty() || norm.split('/').any(|seg| seg == "..") {
            return Err(Error::UnnormalizedPath(path.to_string()));
        }
        let mut segments = norm.split('/').peekable();
        let mut current = &mut self.roots;
        loop {
            let segment = segments.next().expect("path has at least one segment");
            let node = current.entry(segment.to_string()).or_default();
            if segments.peek().is_none() {
                node.file = Some(leaf);
                return Ok(());
            }
            current = &mut node.children;
        }
    }

    /// Emit the finished trie as a sorted list of top-level entries, ready
    /// for inclusion in a manifest's `items` field.
    pub fn into_entries(self) -> Vec<ItemEntry> {
        self.roots
            .into_iter()
            .map(|(name, node)| node.into_entry(name))
            .collect()
    }
}

/// Walk a serialized trie back into `(path, FileLeaf)` pairs, the inverse
/// of [`ItemTrie::add`] + [`ItemTrie::into_entries`].
pub fn walk_entries(entries: &[ItemEntry]) -> Vec<(String, FileLeaf)> {
    let mut out = Vec::new();
    for entry in entries {
        walk_entry(entry, &mut Vec::new(), &mut out);
    }
    out
}

fn walk_entry(entry: &ItemEntry, prefix: &mut Vec<String>, out: &mut Vec<(String, FileLeaf)>) {
    prefix.push(entry.name.clone());
    if let Some(leaf) = &entry.file {
        out.push((prefix.join("/"), leaf.clone()));
    }
    for child in &entry.children {
        walk_entry(child, prefix, out);
    }
    prefix.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(id: u32) -> FileLeaf {
        FileLeaf {
            block_ids: vec![id],
            hash: [id as u8; 64],
            size: 1,
        }
    }

    #[test]
    fn siblings_share_prefix_nodes() {
        let mut trie = ItemTrie::new();
        trie.add("dir/a.bin", leaf(1)).unwrap();
        trie.add("dir/b.bin", leaf(2)).unwrap();
        let entries = trie.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "dir");
        assert!(entries[0].file.is_none());
        assert_eq!(entries[0].children.len(), 2);
    }

    #[test]
    fn round_trips_through_walk() {
        let mut trie = ItemTrie::new();
        trie.add("a/b/c.bin", leaf(1)).unwrap();
        trie.add("a/d.bin", leaf(2)).unwrap();
        trie.add("top.bin", leaf(3)).unwrap();
        let entries = trie.into_entries();
        let mut walked = walk_entries(&entries);
        walked.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            walked.into_iter().map(|(p, _)| p).collect::<Vec<_>>(),
            vec!["a/b/c.bin", "a/d.bin", "top.bin"]
        );
    }

    #[test]
    fn rejects_dotdot_segments() {
        let mut trie = ItemTrie::new();
        assert!(trie.add("a/../b.bin", leaf(1)).is_err());
    }
}
