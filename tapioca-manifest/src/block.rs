//! `BlockInfo`: canonical per-block metadata carried in a manifest

use serde::{Deserialize, Serialize};
use tapioca_hash::BlockHash;

/// The canonical `(hash, size)` pair for a block, as recorded in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockInfo {
    #[serde(with = "serde_bytes_array")]
    pub hash: BlockHash,
    pub size: u32,
}

impl BlockInfo {
    pub fn new(hash: BlockHash, size: u32) -> Self {
        Self { hash, size }
    }
}

/// `serde` doesn't derive `Serialize`/`Deserialize` for `[u8; 64]` directly
/// via `serde_bytes` (that crate only covers `Vec<u8>`/`&[u8]`), so this
/// module provides the fixed-size equivalent used by the `#[serde(with)]`
/// attribute above.
pub(crate) mod serde_bytes_array {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 64], D::Error> {
        let vec: Vec<u8> = Vec::deserialize(deserializer)?;
        vec.try_into()
            .map_err(|v: Vec<u8>| D::Error::custom(format!("expected 64 bytes, got {}", v.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_bincode() {
        let info = BlockInfo::new([7u8; 64], 1024);
        let bytes = bincode::serialize(&info).unwrap();
        let back: BlockInfo = bincode::deserialize(&bytes).unwrap();
        assert_eq!(info, back);
    }
}
