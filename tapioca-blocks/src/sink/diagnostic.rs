//! Diagnostic sinks used mainly in tests and dry runs (spec.md §4.4).

use crate::error::Result;
use crate::record::BlockRecord;

use super::BlockSink;

/// Discards every record. Useful for benchmarking source/processor stages
/// in isolation from sink I/O.
#[derive(Debug, Default)]
pub struct NullBlockSink;

#[async_trait::async_trait]
impl BlockSink for NullBlockSink {
    async fn write(&self, _record: &BlockRecord) -> Result<()> {
        Ok(())
    }
}

/// Prints each record to stdout instead of writing it anywhere durable.
/// The one deliberate exception to "no `println!` in library code",
/// mirroring `ConsoleBlockSink.write_block`'s `print` call in the original
/// `tapioca/core/blocks/block_sinks.py`.
#[derive(Debug, Default)]
pub struct ConsoleBlockSink;

#[async_trait::async_trait]
impl BlockSink for ConsoleBlockSink {
    async fn write(&self, record: &BlockRecord) -> Result<()> {
        println!(
            "{} block {} [{}] {} bytes",
            record.file,
            record.block_id,
            record.fingerprint().as_deref().unwrap_or("?"),
            record.size.unwrap_or(0)
        );
        Ok(())
    }
}
