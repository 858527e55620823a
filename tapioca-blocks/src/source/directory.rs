//! `DirectorySource`: recursively walks a root directory

use std::path::PathBuf;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio::io::AsyncReadExt;

use super::{BlockSource, RecordStream};
use crate::error::{Error, Result};
use crate::record::BlockRecord;

/// How `DirectorySource` handles symlinks (resolves Open Question (c) in
/// spec.md §9 in favor of configurability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkPolicy {
    /// Follow every symlink, including ones that resolve outside `root`.
    Follow,
    /// Follow symlinks that resolve under `root`; skip ones that escape it.
    #[default]
    SkipEscaping,
    /// Never follow symlinks.
    SkipAll,
}

/// Recursively walks `root` in lexicographic depth-first order, opening
/// each regular file and emitting its blocks in ascending `block_id`
/// (spec.md §4.2).
pub struct DirectorySource {
    root: PathBuf,
    block_size: usize,
    symlink_policy: SymlinkPolicy,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            root: root.into(),
            block_size,
            symlink_policy: SymlinkPolicy::default(),
        }
    }

    pub fn with_symlink_policy(mut self, policy: SymlinkPolicy) -> Self {
        self.symlink_policy = policy;
        self
    }

    fn should_follow(&self, entry: &walkdir::DirEntry) -> bool {
        if !entry.path_is_symlink() {
            return true;
        }
        match self.symlink_policy {
            SymlinkPolicy::Follow => true,
            SymlinkPolicy::SkipAll => false,
            SymlinkPolicy::SkipEscaping => std::fs::canonicalize(entry.path())
                .ok()
                .and_then(|target| std::fs::canonicalize(&self.root).ok().map(|r| (target, r)))
                .is_some_and(|(target, root)| target.starts_with(root)),
        }
    }

    /// Enumerate relative file paths under `root`, lexicographically sorted
    /// for deterministic emission order.
    fn list_files(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(Error::Source(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        let mut paths = Vec::new();
        // walkdir's `follow_links` is a single walk-wide setting, not a
        // per-entry choice, so `Follow` (which must descend into symlinked
        // subtrees) needs it on; `SkipAll`/`SkipEscaping` leave it off so a
        // symlinked directory is never descended into, only the symlink's
        // own `DirEntry` is seen (and then dropped by `should_follow`).
        let follow_links = self.symlink_policy == SymlinkPolicy::Follow;
        let walker = walkdir::WalkDir::new(&self.root).follow_links(follow_links);
        for entry in walker {
            let entry = entry.map_err(|e| Error::Source(e.to_string()))?;
            if entry.file_type().is_symlink() && !self.should_follow(&entry) {
                continue;
            }
            if !entry.file_type().is_file() && !(entry.file_type().is_symlink() && entry.path().is_file()) {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            paths.push(rel);
        }
        paths.sort();
        Ok(paths)
    }
}

#[async_trait::async_trait]
impl BlockSource for DirectorySource {
    async fn open(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::Source(format!(
                "cannot open directory source at {}",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn produce(&mut self) -> RecordStream<'_> {
        let block_size = self.block_size;
        let root = self.root.clone();
        let files = match self.list_files() {
            Ok(files) => files,
            Err(e) => {
                return stream::once(async move { Err(e) }).boxed();
            }
        };

        stream::iter(files)
            .flat_map(move |rel| file_block_stream(root.join(&rel), rel, block_size))
            .boxed()
    }
}

struct FileStreamState {
    file: Option<tokio::fs::File>,
    path: PathBuf,
    rel_path: String,
    block_size: usize,
    next_id: u64,
    done: bool,
}

/// Stream the blocks of a single file in ascending `block_id` order,
/// opening the file lazily on first poll.
fn file_block_stream(
    path: PathBuf,
    rel_path: String,
    block_size: usize,
) -> impl futures::Stream<Item = Result<BlockRecord>> + Send {
    stream::unfold(
        FileStreamState {
            file: None,
            path,
            rel_path,
            block_size,
            next_id: 0,
            done: false,
        },
        |mut state| async move {
            if state.done {
                return None;
            }
            if state.file.is_none() {
                match tokio::fs::File::open(&state.path).await {
                    Ok(f) => state.file = Some(f),
                    Err(e) => {
                        state.done = true;
                        return Some((
                            Err(Error::BlockIo {
                                file: state.rel_path.clone(),
                                block_id: state.next_id,
                                source: e,
                            }),
                            state,
                        ));
                    }
                }
            }

            let mut buf = vec![0u8; state.block_size];
            let result = read_fill_or_eof(state.file.as_mut().unwrap(), &mut buf).await;
            match result {
                Ok(0) => {
                    state.done = true;
                    None
                }
                Ok(n) => {
                    buf.truncate(n);
                    let id = state.next_id;
                    state.next_id += 1;
                    let record = BlockRecord::with_bytes(state.rel_path.clone(), id, Bytes::from(buf));
                    Some((Ok(record), state))
                }
                Err(e) => {
                    state.done = true;
                    Some((
                        Err(Error::BlockIo {
                            file: state.rel_path.clone(),
                            block_id: state.next_id,
                            source: e,
                        }),
                        state,
                    ))
                }
            }
        },
    )
}

/// Read up to `buf.len()` bytes, looping past short reads, stopping at EOF.
/// Returns the number of bytes actually read (may be less than `buf.len()`
/// only at end of file).
async fn read_fill_or_eof(file: &mut tokio::fs::File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = file.read(&mut buf[total..]).await?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}
