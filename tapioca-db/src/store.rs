//! `BuildDatabase`: the persistent build-to-manifest index (spec.md §4.7).

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use tapioca_hash::{block_reference_key, BlockHash};
use tapioca_manifest::{BlockInfo, Manifest};
use tracing::debug;

use crate::cache::ManifestCache;
use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::request::BuildRef;

const TREE_CONFIGS: &str = "configs";
const TREE_BUILDS: &str = "builds";
const TREE_BUILD_BLOCKS: &str = "build_blocks";
const TREE_BLOCKS: &str = "blocks";

/// The persistent index mapping builds to their manifests, plus the
/// secondary `build_blocks` index used for dead-block detection. Backed by
/// a single `sled` database file (spec.md §4.7.1).
#[derive(Clone)]
pub struct BuildDatabase {
    db: sled::Db,
    configs: sled::Tree,
    builds: sled::Tree,
    build_blocks: sled::Tree,
    blocks: sled::Tree,
    cache: Arc<ManifestCache>,
}

impl BuildDatabase {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::open_blocking(&path))
            .await
            .map_err(|e| Error::TaskPanic(e.to_string()))?
    }

    fn open_blocking(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            configs: db.open_tree(TREE_CONFIGS)?,
            builds: db.open_tree(TREE_BUILDS)?,
            build_blocks: db.open_tree(TREE_BUILD_BLOCKS)?,
            blocks: db.open_tree(TREE_BLOCKS)?,
            db,
            cache: Arc::new(ManifestCache::default()),
        })
    }

    pub async fn get_config(&self, project_id: &str) -> Result<Option<ProjectConfig>> {
        let configs = self.configs.clone();
        let key = project_id.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || -> Result<Option<ProjectConfig>> {
            match configs.get(key)? {
                Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| Error::TaskPanic(e.to_string()))?
    }

    pub async fn save_config(&self, config: &ProjectConfig) -> Result<()> {
        let configs = self.configs.clone();
        let key = config.project_id.as_bytes().to_vec();
        let bytes = bincode::serialize(config)?;
        tokio::task::spawn_blocking(move || -> Result<()> {
            configs.insert(key, bytes)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::TaskPanic(e.to_string()))?
    }

    /// Reads the manifest for `req`, memoized in an LRU cache invalidated
    /// on every write to `builds` (spec.md §4.7).
    pub async fn get_build(&self, req: &BuildRef) -> Result<Option<Manifest>> {
        let key = req.key();
        if let Some(manifest) = self.cache.get(&key) {
            return Ok(Some(manifest));
        }

        let builds = self.builds.clone();
        let manifest = tokio::task::spawn_blocking(move || -> Result<Option<Manifest>> {
            match builds.get(key)? {
                Some(bytes) => Ok(Some(decode_manifest(&bytes)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| Error::TaskPanic(e.to_string()))??;

        if let Some(manifest) = &manifest {
            self.cache.put(key, manifest.clone());
        }
        Ok(manifest)
    }

    /// One write transaction: `builds[key] = manifest`, and for every
    /// distinct block, `blocks[hash]` and `build_blocks[hash||key]`
    /// (spec.md §4.7 `save_build`).
    pub async fn save_build(&self, manifest: &Manifest, req: &BuildRef) -> Result<()> {
        let key = req.key();
        let encoded = encode_manifest(manifest)?;
        let block_set: Vec<BlockInfo> = manifest.block_set().into_iter().collect();

        let builds = self.builds.clone();
        let build_blocks = self.build_blocks.clone();
        let blocks = self.blocks.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let result: std::result::Result<(), TransactionError<Error>> =
                (&builds, &build_blocks, &blocks).transaction(|(builds, build_blocks, blocks)| {
                    for block in &block_set {
                        let block_bytes = bincode::serialize(&block.size)
                            .map_err(|e| ConflictableTransactionError::Abort(Error::Encode(e)))?;
                        blocks.insert(block.hash.as_slice(), block_bytes)?;
                        let ref_key = block_reference_key(&block.hash, &key);
                        build_blocks.insert(ref_key, &[][..])?;
                    }
                    builds.insert(&key, encoded.clone())?;
                    Ok(())
                });
            result.map_err(transaction_error)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::TaskPanic(e.to_string()))??;

        self.cache.invalidate(&key);
        debug!(project = %req.project, branch = %req.branch, build = %req.build, "saved build");
        Ok(())
    }

    /// One write transaction: delete `builds[key]` and every
    /// `build_blocks[hash||key]` entry belonging to that build's manifest
    /// (spec.md §4.7 `purge_build`).
    pub async fn purge_build(&self, req: &BuildRef) -> Result<()> {
        let key = req.key();
        let builds = self.builds.clone();
        let build_blocks = self.build_blocks.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let result: std::result::Result<(), TransactionError<Error>> =
                (&builds, &build_blocks).transaction(|(builds, build_blocks)| {
                    let Some(existing) = builds.get(&key)? else {
                        return Ok(());
                    };
                    let manifest = decode_manifest(&existing)
                        .map_err(|e| ConflictableTransactionError::Abort(e))?;
                    for block in manifest.block_set() {
                        let ref_key = block_reference_key(&block.hash, &key);
                        build_blocks.remove(ref_key)?;
                    }
                    builds.remove(&key)?;
                    Ok(())
                });
            result.map_err(transaction_error)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::TaskPanic(e.to_string()))??;

        self.cache.invalidate(&key);
        debug!(project = %req.project, branch = %req.branch, build = %req.build, "purged build");
        Ok(())
    }

    /// A block is dead iff no `build_blocks` key starts with its hash
    /// (spec.md §4.7 `is_block_dead`). `sled::Tree::scan_prefix` does the
    /// seek-and-check in one call, the idiomatic equivalent of the
    /// original's manual cursor `seek`+peek.
    pub async fn is_block_dead(&self, hash: &BlockHash) -> Result<bool> {
        let build_blocks = self.build_blocks.clone();
        let hash = *hash;
        tokio::task::spawn_blocking(move || -> Result<bool> {
            Ok(build_blocks.scan_prefix(hash).next().is_none())
        })
        .await
        .map_err(|e| Error::TaskPanic(e.to_string()))?
    }

    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

fn transaction_error(e: TransactionError<Error>) -> Error {
    match e {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => Error::Db(e),
    }
}

fn encode_manifest(manifest: &Manifest) -> Result<Vec<u8>> {
    let raw = tapioca_manifest::to_bytes(manifest)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

fn decode_manifest(bytes: &[u8]) -> Result<Manifest> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(tapioca_manifest::from_bytes(&raw)?)
}
