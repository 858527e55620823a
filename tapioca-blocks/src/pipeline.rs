//! `BlockPipeline`: wires a source through a processor chain to a fan-out
//! of sinks, with bounded concurrency (spec.md §5).

use std::sync::Arc;

use futures::stream::StreamExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::processor::{self, BlockProcessor};
use crate::record::BlockRecord;
use crate::sink::BlockSink;
use crate::source::BlockSource;

/// Default number of records processed concurrently (spec.md §5: a bounded
/// in-flight window rather than unbounded fan-out, so a slow sink or large
/// block can't balloon memory use).
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Outcome counters for a completed pipeline run (spec.md §6: every
/// non-fatal error is counted and logged, never silently swallowed).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub processed: u64,
    pub dropped: u64,
    pub errors: u64,
}

/// Runs a source's blocks through a processor chain and fans each
/// surviving record out to every configured sink concurrently.
pub struct BlockPipeline<S> {
    source: S,
    processors: Vec<Box<dyn BlockProcessor>>,
    sinks: Vec<Arc<dyn BlockSink>>,
    concurrency: usize,
}

impl<S: BlockSource> BlockPipeline<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            processors: Vec::new(),
            sinks: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_processor(mut self, processor: Box<dyn BlockProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn BlockSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run the pipeline to completion: open source and sinks, stream every
    /// block through the processor chain with up to `concurrency` in
    /// flight at once, fan each surviving record out to all sinks, then
    /// close everything. Per-block errors are logged and counted; only an
    /// `Error::Invariant` or a source/sink `open`/`close` failure aborts
    /// the run early (spec.md §6).
    pub async fn run(&mut self) -> Result<PipelineStats> {
        self.source.open().await?;
        for sink in &self.sinks {
            sink.open().await?;
        }

        let stats = self.drain().await;

        self.source.close().await?;
        for sink in &self.sinks {
            sink.close().await?;
        }

        stats
    }

    async fn drain(&mut self) -> Result<PipelineStats> {
        let mut stats = PipelineStats::default();
        let processors = &self.processors;
        let sinks = &self.sinks;

        let mut results = self
            .source
            .produce()
            .map(|item| async move {
                match item {
                    Ok(record) => processor::run_chain(processors, record).await,
                    Err(e) => Err(e),
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some(result) = results.next().await {
            match result {
                Ok(Some(record)) => {
                    fan_out(sinks, &record, &mut stats).await?;
                    stats.processed += 1;
                }
                Ok(None) => {
                    stats.dropped += 1;
                }
                Err(Error::Invariant(msg)) => {
                    return Err(Error::Invariant(msg));
                }
                Err(e) => {
                    warn!(error = %e, "dropping block after processing error");
                    stats.errors += 1;
                }
            }
        }

        Ok(stats)
    }
}

async fn fan_out(sinks: &[Arc<dyn BlockSink>], record: &BlockRecord, stats: &mut PipelineStats) -> Result<()> {
    let writes = sinks.iter().map(|sink| {
        let sink = sink.clone();
        let record = record.clone();
        async move { sink.write(&record).await }
    });
    for result in futures::future::join_all(writes).await {
        match result {
            Ok(()) => {}
            Err(Error::Invariant(msg)) => return Err(Error::Invariant(msg)),
            Err(e) => {
                warn!(error = %e, file = %record.file, block_id = record.block_id, "sink write failed");
                stats.errors += 1;
            }
        }
    }
    debug!(file = %record.file, block_id = record.block_id, "fanned out to sinks");
    Ok(())
}
