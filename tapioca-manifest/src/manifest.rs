//! The `Manifest`: a content-addressed description of a build's file tree

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::block::BlockInfo;
use crate::error::{Error, Result};
use crate::file::{normalize_path, FileInfo};

/// Largest `max_block_size` a manifest may declare (spec.md §6).
pub const MAX_BLOCK_SIZE: u32 = 16 * 1024 * 1024;

/// Default block size: 1 MiB (spec.md §6).
pub const DEFAULT_BLOCK_SIZE: u32 = 1024 * 1024;

/// A build's file tree, keyed by normalized path, plus the block size it
/// was split with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    files: BTreeMap<String, FileInfo>,
    max_block_size: u32,
}

impl Manifest {
    /// Construct an empty manifest. `max_block_size` must be a power of two
    /// no greater than [`MAX_BLOCK_SIZE`] (spec.md §6).
    pub fn new(max_block_size: u32) -> Result<Self> {
        if !max_block_size.is_power_of_two() {
            return Err(Error::BlockSizeNotPowerOfTwo(max_block_size));
        }
        if max_block_size > MAX_BLOCK_SIZE {
            return Err(Error::BlockSizeTooLarge(max_block_size));
        }
        Ok(Self {
            files: BTreeMap::new(),
            max_block_size,
        })
    }

    pub fn max_block_size(&self) -> u32 {
        self.max_block_size
    }

    /// Insert a file, validating the block-size invariant: every block must
    /// be `<= max_block_size`, and only the terminal block of a file may be
    /// strictly smaller (spec.md §3).
    pub fn add_file(&mut self, file: FileInfo) -> Result<()> {
        self.validate_file(&file)?;
        self.files.insert(file.path.clone(), file);
        Ok(())
    }

    fn validate_file(&self, file: &FileInfo) -> Result<()> {
        if file.path.is_empty() || normalize_path(&file.path) != file.path {
            return Err(Error::UnnormalizedPath(file.path.clone()));
        }
        let last = file.blocks.len().saturating_sub(1);
        for (idx, block) in file.blocks.iter().enumerate() {
            if block.size > self.max_block_size {
                return Err(Error::BlockTooLarge {
                    path: file.path.clone(),
                    block_id: idx as u64,
                    size: block.size,
                    max: self.max_block_size,
                });
            }
            if idx != last && block.size != self.max_block_size {
                return Err(Error::ShortNonTerminalBlock {
                    path: file.path.clone(),
                    block_id: idx as u64,
                    size: block.size,
                    max: self.max_block_size,
                });
            }
        }
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = &FileInfo> {
        self.files.values()
    }

    pub fn file(&self, path: &str) -> Option<&FileInfo> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The set of distinct `(hash, size)` pairs across all files — the
    /// manifest's block set (spec.md §3).
    pub fn block_set(&self) -> HashSet<BlockInfo> {
        self.files
            .values()
            .flat_map(|f| f.blocks.iter().copied())
            .collect()
    }

    /// Total space used by the files described by the manifest, in bytes.
    pub fn total_space(&self) -> u64 {
        self.files.values().map(|f| f.size).sum()
    }

    /// Preallocate space for every file in the manifest under `root_dir`,
    /// creating sparse files of exactly the declared size (spec.md §8,
    /// invariant 8). Mirrors the original `manifest.py::preallocate_space`,
    /// restated with `std::fs` instead of a disk-usage precheck that
    /// requires a platform-specific syscall.
    pub fn preallocate(&self, root_dir: &Path) -> Result<()> {
        for file in self.files.values() {
            let full_path = root_dir.join(&file.path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let f = std::fs::File::create(&full_path)?;
            f.set_len(file.size)?;
        }
        Ok(())
    }
}
