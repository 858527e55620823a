//! `ManifestDiff`: per-file, per-block comparison between two manifests

use std::collections::BTreeMap;

use tapioca_hash::BlockHash;

use crate::file::FileInfo;
use crate::manifest::Manifest;

/// The diff of a single file between a remote (target) and current (local)
/// manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// `true` when the file exists in `current` but not in `remote`.
    pub deleted: bool,
    /// `true` when the file exists in `remote` but not in `current`.
    pub new: bool,
    /// `block_id -> (current_hash, remote_hash)` for every position where
    /// the two sequences differ, including positions where one side has no
    /// block at all (`None`).
    pub changed_blocks: BTreeMap<u64, (Option<BlockHash>, Option<BlockHash>)>,
}

impl FileDiff {
    fn compute(remote: Option<&FileInfo>, current: Option<&FileInfo>) -> Self {
        let deleted = remote.is_none() && current.is_some();
        let new = remote.is_some() && current.is_none();

        let mut changed_blocks = BTreeMap::new();
        if !deleted && !new {
            // Both sides present: pairwise-zip the block sequences.
            let r_blocks = remote.map(|f| f.blocks.as_slice()).unwrap_or(&[]);
            let c_blocks = current.map(|f| f.blocks.as_slice()).unwrap_or(&[]);
            let max_len = r_blocks.len().max(c_blocks.len());
            for idx in 0..max_len {
                let r_hash = r_blocks.get(idx).map(|b| b.hash);
                let c_hash = c_blocks.get(idx).map(|b| b.hash);
                if r_hash != c_hash {
                    changed_blocks.insert(idx as u64, (c_hash, r_hash));
                }
            }
        }

        Self {
            deleted,
            new,
            changed_blocks,
        }
    }

    pub fn has_changed(&self) -> bool {
        self.deleted || self.new || !self.changed_blocks.is_empty()
    }
}

/// The diff between a remote (target) manifest and a current (local)
/// manifest, keyed by path, restricted to files that actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDiff {
    pub changed_files: BTreeMap<String, FileDiff>,
}

impl ManifestDiff {
    pub fn new(remote: &Manifest, current: &Manifest) -> Self {
        let mut paths: Vec<&str> = remote
            .files()
            .map(|f| f.path.as_str())
            .chain(current.files().map(|f| f.path.as_str()))
            .collect();
        paths.sort_unstable();
        paths.dedup();

        let mut changed_files = BTreeMap::new();
        for path in paths {
            let diff = FileDiff::compute(remote.file(path), current.file(path));
            if diff.has_changed() {
                changed_files.insert(path.to_string(), diff);
            }
        }
        Self { changed_files }
    }

    pub fn has_changed(&self) -> bool {
        !self.changed_files.is_empty()
    }
}
