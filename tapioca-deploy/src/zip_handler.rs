//! `ZipDeploymentHandler`: the one concrete handler this crate ships,
//! grounded on the original `tapioca/server/handlers/unity.py`, which
//! consumed a zip of a Unity build (spec.md §4.8 supplement).

use std::sync::Arc;

use tapioca_blocks::pipeline::BlockPipeline;
use tapioca_blocks::processor::{BlockHasher, DedupBlockProcessor};
use tapioca_blocks::sink::{BlockSink, ManifestBlockSink};
use tapioca_blocks::source::BlockSource;
use tapioca_db::BuildDatabase;

use crate::error::{Error, Result};
use crate::handler::{BuildOutcome, DeploymentHandler};
use crate::request::BuildRequest;

/// Drives a zip-archive build (or any other [`BlockSource`] the caller
/// hands it — the handler itself is source-agnostic, matching
/// `unity.py`'s actual behavior of accepting "a zip" without inspecting
/// its internal layout) through a pipeline that hashes, deduplicates, and
/// uploads blocks to `upload_sink`, then records the resulting manifest in
/// `db`.
pub struct ZipDeploymentHandler {
    db: BuildDatabase,
    upload_sink: Arc<dyn BlockSink>,
    max_block_size: u32,
}

impl ZipDeploymentHandler {
    pub fn new(db: BuildDatabase, upload_sink: Arc<dyn BlockSink>, max_block_size: u32) -> Self {
        Self { db, upload_sink, max_block_size }
    }
}

#[async_trait::async_trait]
impl DeploymentHandler for ZipDeploymentHandler {
    async fn deploy(&self, req: &BuildRequest, source: Box<dyn BlockSource>) -> Result<BuildOutcome> {
        let manifest_sink = Arc::new(ManifestBlockSink::new(self.max_block_size));
        let manifest_sink_dyn: Arc<dyn BlockSink> = manifest_sink.clone();

        let mut pipeline = BlockPipeline::new(source)
            .with_processor(Box::new(BlockHasher::new()))
            .with_processor(Box::new(DedupBlockProcessor::new()))
            .with_sink(self.upload_sink.clone())
            .with_sink(manifest_sink_dyn);

        let stats = pipeline.run().await?;
        drop(pipeline);

        let manifest = Arc::try_unwrap(manifest_sink)
            .map_err(|_| Error::Handler("manifest sink still shared after pipeline completion".into()))?
            .finish()?;

        self.db.save_build(&manifest, &req.build_ref()).await?;

        Ok(BuildOutcome { manifest, stats })
    }
}
