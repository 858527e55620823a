//! `ZipFileSource`: reads entries out of a zip archive (spec.md §4.2)

use std::io::Read;
use std::path::PathBuf;

use bytes::Bytes;
use futures::stream::{self, StreamExt};

use super::{BlockSource, RecordStream};
use crate::error::{Error, Result};
use crate::record::BlockRecord;

/// A single decompressed archive entry, read eagerly at `open()` time.
struct ArchiveEntry {
    path: String,
    bytes: Bytes,
}

/// Reads every file entry out of a zip archive and emits its blocks.
///
/// Unlike [`super::DirectorySource`], entries are decompressed eagerly when
/// the source opens rather than lazily per-poll: the `zip` crate's reader
/// API is not `Send`-friendly across await points, so the archive is fully
/// materialized inside a single `spawn_blocking` call and the resulting
/// bytes are then chunked lazily. For archives far larger than available
/// memory this is a real limitation, noted in DESIGN.md.
pub struct ZipFileSource {
    archive_path: PathBuf,
    block_size: usize,
    entries: Vec<ArchiveEntry>,
}

impl ZipFileSource {
    pub fn new(archive_path: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            archive_path: archive_path.into(),
            block_size,
            entries: Vec::new(),
        }
    }

    fn read_archive(path: &std::path::Path) -> Result<Vec<ArchiveEntry>> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Source(format!("cannot open archive {}: {e}", path.display())))?;
        let mut archive = ::zip::ZipArchive::new(file)
            .map_err(|e| Error::Source(format!("invalid zip archive {}: {e}", path.display())))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| Error::Source(format!("cannot read archive entry {i}: {e}")))?;
            if !entry.is_file() {
                continue;
            }
            let name = entry.name().replace('\\', "/");
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .map_err(|e| Error::Source(format!("cannot decompress {name}: {e}")))?;
            entries.push(ArchiveEntry {
                path: name,
                bytes: Bytes::from(buf),
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl BlockSource for ZipFileSource {
    async fn open(&mut self) -> Result<()> {
        let path = self.archive_path.clone();
        self.entries = tokio::task::spawn_blocking(move || Self::read_archive(&path))
            .await
            .map_err(|e| Error::Source(format!("archive read task panicked: {e}")))??;
        Ok(())
    }

    fn produce(&mut self) -> RecordStream<'_> {
        let block_size = self.block_size.max(1);
        let entries = std::mem::take(&mut self.entries);

        stream::iter(entries)
            .flat_map(move |entry| {
                let records: Vec<Result<BlockRecord>> = entry
                    .bytes
                    .chunks(block_size)
                    .enumerate()
                    .map(|(id, chunk)| {
                        Ok(BlockRecord::with_bytes(
                            entry.path.clone(),
                            id as u64,
                            Bytes::copy_from_slice(chunk),
                        ))
                    })
                    .collect();
                stream::iter(records)
            })
            .boxed()
    }
}
