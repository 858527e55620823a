//! The block pipeline: sources, processors, and sinks that move content-
//! addressed blocks between a filesystem/archive and durable storage
//! (spec.md §4).

pub mod error;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod sink;
pub mod source;

pub use error::{Error, Result};
pub use pipeline::{BlockPipeline, PipelineStats, DEFAULT_CONCURRENCY};
pub use record::BlockRecord;
