//! `DeploymentHandler`: the dispatch target behind `POST
//! /deploy/{handler}/...` (spec.md §4.8), and the [`HandlerRegistry`] that
//! resolves the `{handler}` path segment to one.

use std::sync::Arc;

use dashmap::DashMap;
use tapioca_blocks::pipeline::PipelineStats;
use tapioca_blocks::source::BlockSource;
use tapioca_manifest::Manifest;

use crate::error::{Error, Result};
use crate::request::BuildRequest;

/// What a successful deploy produced: the manifest now saved to the build
/// database, and pipeline counters for observability.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub manifest: Manifest,
    pub stats: PipelineStats,
}

/// Consumes an external build representation (the `source`) and drives it
/// through a pipeline ending in `BuildDatabase::save_build`. Each concrete
/// handler owns whatever upload sinks and database handle it needs.
#[async_trait::async_trait]
pub trait DeploymentHandler: Send + Sync {
    async fn deploy(&self, req: &BuildRequest, source: Box<dyn BlockSource>) -> Result<BuildOutcome>;
}

/// Maps the `{handler}` path segment to a registered [`DeploymentHandler`].
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<String, Arc<dyn DeploymentHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn DeploymentHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub async fn dispatch(&self, req: &BuildRequest, source: Box<dyn BlockSource>) -> Result<BuildOutcome> {
        let handler = self
            .handlers
            .get(&req.handler)
            .map(|entry| entry.clone())
            .ok_or_else(|| Error::UnknownHandler(req.handler.clone()))?;
        handler.deploy(req, source).await
    }
}
