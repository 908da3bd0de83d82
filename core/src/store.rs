//! Sequential reader over fixed-capacity posting blocks.

use crate::error::{Result, SearchError};
use crate::index::BlockLocation;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum number of bytes the index writer puts into one block file.
pub const BLOCK_SIZE: u64 = 1_999_998;

/// Materialises a block file of sub-index `index` that is not resident locally.
///
/// Implementations must be idempotent: fetching a block twice leaves the same file.
pub trait BlockFetcher: Send + Sync {
    fn fetch(&self, index: &str, block: &str, dest: &Path) -> Result<()>;
}

/// Copies blocks out of a mirror laid out like the index root (`<root>/<index>/<block>`),
/// e.g. a mounted bucket.
#[derive(Debug, Clone)]
pub struct MirrorFetcher {
    root: PathBuf,
}

impl MirrorFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl BlockFetcher for MirrorFetcher {
    fn fetch(&self, index: &str, block: &str, dest: &Path) -> Result<()> {
        let src = self.root.join(index).join(block);
        if !src.is_file() {
            return Err(SearchError::Fetch { block: block.to_string(), reason: format!("{} not in mirror", src.display()) });
        }
        let parent = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        // Each fetch copies into its own temporary file; readers only ever see a whole block.
        let mut tmp = NamedTempFile::new_in(parent)?;
        io::copy(&mut File::open(&src)?, tmp.as_file_mut())?;
        match tmp.persist(dest) {
            Ok(_) => Ok(()),
            // another fetch already put the block in place
            Err(_) if dest.is_file() => Ok(()),
            Err(e) => Err(e.error.into()),
        }
    }
}

pub struct PostingStore {
    dir: PathBuf,
    block_size: u64,
    handles: RwLock<HashMap<String, Arc<File>>>,
    fetcher: Option<(String, Arc<dyn BlockFetcher>)>,
    fetch_lock: Mutex<()>,
}

impl PostingStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), block_size: BLOCK_SIZE, handles: RwLock::new(HashMap::new()), fetcher: None, fetch_lock: Mutex::new(()) }
    }

    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    /// Fetch absent blocks of sub-index `index` through `fetcher`.
    pub fn with_fetcher(mut self, index: impl Into<String>, fetcher: Arc<dyn BlockFetcher>) -> Self {
        self.fetcher = Some((index.into(), fetcher));
        self
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn block_size(&self) -> u64 { self.block_size }

    pub fn has_fetcher(&self) -> bool { self.fetcher.is_some() }

    pub fn block_path(&self, block: &str) -> PathBuf { self.dir.join(block) }

    pub fn open_blocks(&self) -> usize { self.handles.read().len() }

    /// Read `total_bytes` starting at the first location, continuing into the next
    /// location whenever a block's capacity is exhausted.
    ///
    /// The returned buffer is shorter than `total_bytes` only if the block files
    /// themselves are short; callers treat that as corruption.
    pub fn read(&self, locs: &[BlockLocation], total_bytes: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(total_bytes);
        let mut remaining = total_bytes as u64;
        for loc in locs {
            if remaining == 0 {
                break;
            }
            let file = self.handle(&loc.block)?;
            let n_read = remaining.min(self.block_size.saturating_sub(loc.offset));
            let start = out.len();
            out.resize(start + n_read as usize, 0);
            let got = read_fully_at(&file, &mut out[start..], loc.offset)?;
            out.truncate(start + got);
            remaining -= n_read;
        }
        Ok(out)
    }

    /// Fetch every referenced block that is not resident. Resident blocks are skipped,
    /// so repeated calls are no-ops once the blocks are on disk.
    ///
    /// Fetches through one store are serialized; a caller that waited on another
    /// query's fetch finds the block resident and skips it.
    pub fn fetch_missing(&self, locs: &[BlockLocation]) -> Result<usize> {
        let Some((index, fetcher)) = &self.fetcher else { return Ok(0) };
        let _guard = self.fetch_lock.lock();
        let mut fetched = 0;
        for loc in locs {
            let path = self.block_path(&loc.block);
            if path.is_file() {
                continue;
            }
            tracing::info!(index = %index, block = %loc.block, "fetching posting block");
            fetcher.fetch(index, &loc.block, &path)?;
            fetched += 1;
        }
        Ok(fetched)
    }

    /// Drop every cached handle. The store stays usable and reopens blocks lazily.
    pub fn close(&self) {
        self.handles.write().clear();
    }

    fn handle(&self, block: &str) -> Result<Arc<File>> {
        if let Some(f) = self.handles.read().get(block) {
            return Ok(Arc::clone(f));
        }
        let path = self.block_path(block);
        let file = match File::open(&path) {
            Ok(f) => Arc::new(f),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SearchError::MissingBlock { block: block.to_string(), path });
            }
            Err(e) => return Err(e.into()),
        };
        let mut handles = self.handles.write();
        Ok(Arc::clone(handles.entry(block.to_string()).or_insert(file)))
    }
}

impl std::fmt::Debug for PostingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostingStore")
            .field("dir", &self.dir)
            .field("block_size", &self.block_size)
            .field("open_blocks", &self.open_blocks())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

/// Positional read that stops early only at end of file.
fn read_fully_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}
