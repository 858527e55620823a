//! `InMemorySource`: feeds pre-built records from memory, mainly for tests
//! and for composing sources programmatically (spec.md §4.2 "Non-goals"
//! list in-memory fixtures as in-scope for testing).

use futures::stream::{self, StreamExt};

use super::{BlockSource, RecordStream};
use crate::record::BlockRecord;

pub struct InMemorySource {
    records: Vec<BlockRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<BlockRecord>) -> Self {
        Self { records }
    }

    /// Build an in-memory source by chunking a single file's bytes into
    /// fixed-size blocks, convenient for unit tests that don't need a real
    /// filesystem.
    pub fn chunked(file: impl Into<String>, bytes: &[u8], block_size: usize) -> Self {
        let file = file.into();
        let records = bytes
            .chunks(block_size.max(1))
            .enumerate()
            .map(|(id, chunk)| {
                BlockRecord::with_bytes(file.clone(), id as u64, bytes::Bytes::copy_from_slice(chunk))
            })
            .collect();
        Self { records }
    }
}

#[async_trait::async_trait]
impl BlockSource for InMemorySource {
    fn produce(&mut self) -> RecordStream<'_> {
        stream::iter(std::mem::take(&mut self.records).into_iter().map(Ok)).boxed()
    }
}
