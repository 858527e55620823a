//! `BlockRegistry`: dedup table assigning dense integer ids to distinct
//! `(hash, size)` pairs in first-seen order, for manifest serialization.

use std::collections::HashMap;

use tapioca_hash::BlockHash;
use tracing::warn;

use crate::block::BlockInfo;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: Vec<BlockInfo>,
    index: HashMap<BlockHash, u32>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block, returning its dense integer id. A hash seen before
    /// with a different size is a protocol violation and logged as a
    /// warning the way the original `manifest.py::BlockRegistry._register`
    /// prints on collision (the size must still match, which fails loudly).
    pub fn register(&mut self, info: BlockInfo) -> Result<u32> {
        if let Some(&id) = self.index.get(&info.hash) {
            let existing = self.blocks[id as usize];
            if existing.size != info.size {
                return Err(Error::BlockSizeCollision(existing.size, info.size));
            }
            warn!(hash = %tapioca_hash::fingerprint(&info.hash), "duplicate block registered");
            return Ok(id);
        }
        let id = self.blocks.len() as u32;
        self.blocks.push(info);
        self.index.insert(info.hash, id);
        Ok(id)
    }

    pub fn get_id(&self, hash: &BlockHash) -> Option<u32> {
        self.index.get(hash).copied()
    }

    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<BlockInfo> {
        self.blocks
    }

    pub fn from_blocks(blocks: Vec<BlockInfo>) -> Self {
        let index = blocks
            .iter()
            .enumerate()
            .map(|(id, info)| (info.hash, id as u32))
            .collect();
        Self { blocks, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_order_is_preserved() {
        let mut reg = BlockRegistry::new();
        let a = reg.register(BlockInfo::new([1u8; 64], 10)).unwrap();
        let b = reg.register(BlockInfo::new([2u8; 64], 20)).unwrap();
        assert_eq!((a, b), (0, 1));
    }

    #[test]
    fn duplicate_hash_same_size_returns_same_id() {
        let mut reg = BlockRegistry::new();
        let a = reg.register(BlockInfo::new([9u8; 64], 5)).unwrap();
        let b = reg.register(BlockInfo::new([9u8; 64], 5)).unwrap();
        assert_eq!(a, b);
        assert_eq!(reg.blocks().len(), 1);
    }

    #[test]
    fn duplicate_hash_different_size_errors() {
        let mut reg = BlockRegistry::new();
        reg.register(BlockInfo::new([9u8; 64], 5)).unwrap();
        assert!(reg.register(BlockInfo::new([9u8; 64], 6)).is_err());
    }
}
