//! Mtime-invalidated in-memory copy of the library asset.
//!
//! Reads of an up-to-date copy are lock-free (`arc-swap`). Only a refresh
//! takes the mutex, and it re-checks the timestamp once inside so concurrent
//! callers that saw the same stale copy trigger a single re-read.

use super::ServerError;
use crate::debug;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

/// Read attempts on a file being written in place before keeping a copy
/// whose timestamp lags its content.
const READ_ATTEMPTS: usize = 3;

/// One snapshot of the asset: its text and the source mtime it reflects.
#[derive(Debug)]
pub struct CachedAsset {
    pub content: String,
    pub modified: SystemTime,
}

/// Cache for a single frequently requested text file.
pub struct AssetCache {
    path: PathBuf,
    current: ArcSwapOption<CachedAsset>,
    refresh: Mutex<()>,
    reads: AtomicUsize,
}

impl AssetCache {
    /// Create an empty cache for `path`. Nothing is read until the first `get`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: ArcSwapOption::empty(),
            refresh: Mutex::new(()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the source file has been read from disk.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Return the asset, re-reading it first if the source mtime advanced.
    ///
    /// A failed refresh is returned as an error; the previous copy is never
    /// served in its place.
    pub fn get(&self) -> Result<Arc<CachedAsset>, ServerError> {
        let modified = self.source_mtime()?;
        if let Some(cached) = self.current.load_full()
            && cached.modified >= modified
        {
            return Ok(cached);
        }
        self.refresh()
    }

    /// Serialized check-and-read.
    ///
    /// Timestamp and content come from the same open handle, so a file
    /// replaced by rename is never paired with its predecessor's mtime. An
    /// in-place write during the read is detected and the read repeated; if
    /// it never settles, the older timestamp is kept so the next `get`
    /// re-reads.
    fn refresh(&self) -> Result<Arc<CachedAsset>, ServerError> {
        let _guard = self.refresh.lock();

        let mut attempt = 0;
        let (content, modified) = loop {
            attempt += 1;
            let mut file = File::open(&self.path).map_err(|source| self.read_error(source))?;
            let modified = self.handle_mtime(&file)?;

            // Another caller may have refreshed while we waited for the lock.
            if let Some(cached) = self.current.load_full()
                && cached.modified >= modified
            {
                return Ok(cached);
            }

            let mut content = String::new();
            file.read_to_string(&mut content)
                .map_err(|source| self.read_error(source))?;
            self.reads.fetch_add(1, Ordering::Relaxed);

            if self.handle_mtime(&file)? == modified || attempt >= READ_ATTEMPTS {
                break (content, modified);
            }
        };

        let fresh = Arc::new(CachedAsset { content, modified });
        self.current.store(Some(Arc::clone(&fresh)));
        debug!("serve"; "refreshed {} ({} bytes)", self.path.display(), fresh.content.len());
        Ok(fresh)
    }

    fn source_mtime(&self) -> Result<SystemTime, ServerError> {
        self.path
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|source| self.read_error(source))
    }

    fn handle_mtime(&self, file: &File) -> Result<SystemTime, ServerError> {
        file.metadata()
            .and_then(|m| m.modified())
            .map_err(|source| self.read_error(source))
    }

    fn read_error(&self, source: std::io::Error) -> ServerError {
        ServerError::AssetRead {
            path: self.path.clone(),
            source,
        }
    }
}
