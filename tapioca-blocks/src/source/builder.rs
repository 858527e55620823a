//! `ManifestBuilderBlockSource`: tees an inner source's records into a
//! shared [`crate::sink::ManifestBuilder`] as they pass through, so a
//! pipeline can build its output manifest directly from what it read
//! rather than from a separate accumulation pass (spec.md §4.5).

use std::sync::Arc;

use futures::stream::StreamExt;
use parking_lot::Mutex;

use super::{BlockSource, RecordStream};
use crate::error::Result;
use crate::sink::ManifestBuilder;

pub struct ManifestBuilderBlockSource<S> {
    inner: S,
    builder: Arc<Mutex<ManifestBuilder>>,
}

impl<S: BlockSource> ManifestBuilderBlockSource<S> {
    pub fn new(inner: S, builder: Arc<Mutex<ManifestBuilder>>) -> Self {
        Self { inner, builder }
    }
}

#[async_trait::async_trait]
impl<S: BlockSource> BlockSource for ManifestBuilderBlockSource<S> {
    async fn open(&mut self) -> Result<()> {
        self.inner.open().await
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await
    }

    fn produce(&mut self) -> RecordStream<'_> {
        let builder = self.builder.clone();
        self.inner
            .produce()
            .inspect(move |result| {
                if let Ok(record) = result {
                    builder.lock().observe(record);
                }
            })
            .boxed()
    }
}
