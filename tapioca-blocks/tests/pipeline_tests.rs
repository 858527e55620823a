//! End-to-end pipeline scenarios (spec.md §8, S2/S5/S6). Block counts and
//! sizes are scaled down from the spec's literal MiB-scale numbers to keep
//! the test suite fast; the invariant each scenario demonstrates is
//! unchanged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use tapioca_blocks::error::Result;
use tapioca_blocks::pipeline::BlockPipeline;
use tapioca_blocks::processor::{
    BlockFetcher, BlockHasher, DedupBlockProcessor, FetchBlockProcessor, ValidateBlockProcessor,
};
use tapioca_blocks::sink::{BlockBucket, BlockSink, InstallationBlockSink, LocalStorageBlockSink, ObjectStorageBlockSink};
use tapioca_blocks::source::{DirectorySource, ManifestBlockSource};
use tapioca_hash::BlockHash;
use tapioca_manifest::{BlockInfo, FileInfo, Manifest};

// Scenario S2: two identical files share every block; Hasher -> Dedup ->
// LocalStorageBlockSink ends up storing only the distinct blocks.
#[tokio::test]
async fn scenario_s2_identical_files_dedup_to_distinct_block_count() {
    let dir = tempfile::tempdir().unwrap();
    let contents = [b"AAAA".as_slice(), b"BBBB".as_slice(), b"CCCC".as_slice()].concat();
    std::fs::write(dir.path().join("x.bin"), &contents).unwrap();
    std::fs::write(dir.path().join("y.bin"), &contents).unwrap();

    let storage_dir = tempfile::tempdir().unwrap();
    let source = DirectorySource::new(dir.path(), 4);
    let sink: Arc<dyn BlockSink> = Arc::new(LocalStorageBlockSink::new(storage_dir.path()));

    let mut pipeline = BlockPipeline::new(source)
        .with_processor(Box::new(BlockHasher::new()))
        .with_processor(Box::new(DedupBlockProcessor::new()))
        .with_sink(sink);
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.dropped, 3);
    let stored = std::fs::read_dir(storage_dir.path()).unwrap().count();
    assert_eq!(stored, 3);
}

// Scenario S5: a corrupted stored block fails validation; the download
// pipeline drops that block and never overwrites the preallocated bytes at
// its offset.
#[tokio::test]
async fn scenario_s5_corrupted_block_is_dropped_before_install() {
    // Non-terminal blocks must equal `max_block_size` exactly; only the
    // terminal block of a file may be shorter (spec.md §3).
    let data0 = b"ABCDEFGH".to_vec();
    let data1 = b"xyz".to_vec();
    let hash0 = tapioca_hash::hash_block(&data0);
    let hash1 = tapioca_hash::hash_block(&data1);

    let mut manifest = Manifest::new(8).unwrap();
    manifest
        .add_file(FileInfo {
            path: "f.bin".to_string(),
            blocks: vec![BlockInfo::new(hash0, data0.len() as u32), BlockInfo::new(hash1, data1.len() as u32)],
            hash: [0u8; 64],
            size: (data0.len() + data1.len()) as u64,
        })
        .unwrap();

    let install_dir = tempfile::tempdir().unwrap();
    manifest.preallocate(install_dir.path()).unwrap();

    // Fetcher returns correct bytes for block 0 but corrupted bytes for
    // block 1, simulating bit rot in the remote store.
    let fetcher = Arc::new(CorruptingFetcher {
        good: vec![(hash0, Bytes::from(data0))],
        corrupt_hash: hash1,
        corrupt_bytes: Bytes::from(b"bad".to_vec()),
    });

    let source = ManifestBlockSource::new(&manifest);
    let install_sink: Arc<dyn BlockSink> = Arc::new(InstallationBlockSink::new(install_dir.path(), &manifest));

    let mut pipeline = BlockPipeline::new(source)
        .with_processor(Box::new(FetchBlockProcessor::new(fetcher)))
        .with_processor(Box::new(ValidateBlockProcessor::new()))
        .with_sink(install_sink);
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.errors, 1);

    let installed = std::fs::read(install_dir.path().join("f.bin")).unwrap();
    assert_eq!(&installed[..8], b"ABCDEFGH");
    // The second block's preallocated zero bytes were never overwritten.
    assert_eq!(&installed[8..], &[0u8; 3]);
}

struct CorruptingFetcher {
    good: Vec<(BlockHash, Bytes)>,
    corrupt_hash: BlockHash,
    corrupt_bytes: Bytes,
}

#[async_trait]
impl BlockFetcher for CorruptingFetcher {
    async fn fetch(&self, hash: &BlockHash) -> Result<Bytes> {
        if *hash == self.corrupt_hash {
            return Ok(self.corrupt_bytes.clone());
        }
        for (h, bytes) in &self.good {
            if h == hash {
                return Ok(bytes.clone());
            }
        }
        panic!("fetch called for unknown hash");
    }
}

// Scenario S6: concurrent upload of N distinct blocks produces exactly N
// upload calls regardless of concurrency window.
#[tokio::test]
async fn scenario_s6_concurrent_upload_calls_bucket_exactly_once_per_block() {
    let bucket = CountingBucket::default();
    let calls = bucket.puts.clone();

    let records: Vec<_> = (0..200u32)
        .map(|i| {
            let bytes = Bytes::from(i.to_le_bytes().to_vec());
            tapioca_blocks::record::BlockRecord::with_bytes(format!("f{i}"), 0, bytes)
        })
        .collect();

    let source = tapioca_blocks::source::InMemorySource::new(records);
    let sink: Arc<dyn BlockSink> = Arc::new(ObjectStorageBlockSink::new(bucket));

    let mut pipeline = BlockPipeline::new(source)
        .with_processor(Box::new(BlockHasher::new()))
        .with_processor(Box::new(DedupBlockProcessor::new()))
        .with_sink(sink)
        .with_concurrency(32);
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.processed, 200);
    assert_eq!(stats.dropped, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 200);
}

#[derive(Default)]
struct CountingBucket {
    puts: Arc<AtomicUsize>,
    inner: tapioca_blocks::sink::InMemoryBlockBucket,
}

#[async_trait]
impl BlockBucket for CountingBucket {
    async fn exists(&self, fingerprint: &str) -> Result<bool> {
        self.inner.exists(fingerprint).await
    }

    async fn put(&self, fingerprint: &str, bytes: &[u8]) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(fingerprint, bytes).await
    }
}
