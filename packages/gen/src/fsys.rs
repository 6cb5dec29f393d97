//! The filesystem capability the generator writes and stats through.
//!
//! The generator never touches `std::fs` directly for its outputs; it
//! depends on this narrow capability so tests can substitute the
//! in-memory [`MemFileSystem`] double. The capability is deliberately
//! exactly three operations: open-for-write, read, stat.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// What `stat` reports about one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    /// Content length in bytes.
    pub size: u64,
    /// Modification time as unix seconds.
    pub modified: i64,
    /// Permission bits.
    pub mode: u32,
    pub is_dir: bool,
}

/// Abstract filesystem access: open-for-write, read, stat.
pub trait FileSystem: Send + Sync {
    /// Open `path` for writing, truncating any existing file.
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn Write>>;

    /// Read the full content of the file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Stat the entry at `path`.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(fs::File::create(path)?))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        Ok(FileInfo {
            size: meta.len(),
            modified: unix_seconds(meta.modified()?),
            mode: mode_bits(&meta),
            is_dir: meta.is_dir(),
        })
    }
}

fn unix_seconds(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.is_dir() {
        0o755
    } else {
        0o644
    }
}

/// In-memory filesystem double for tests.
///
/// Written files land in a shared map readable after the code under test
/// ran; `failing_open` and `failing_write` variants force the two error
/// paths callers must handle.
#[derive(Debug, Default, Clone)]
pub struct MemFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    fail_open: bool,
    fail_write: bool,
}

impl MemFileSystem {
    pub fn new() -> Self {
        MemFileSystem::default()
    }

    /// A double whose `open_write` always fails.
    pub fn failing_open() -> Self {
        MemFileSystem {
            fail_open: true,
            ..MemFileSystem::default()
        }
    }

    /// A double whose writers fail on the first write.
    pub fn failing_write() -> Self {
        MemFileSystem {
            fail_write: true,
            ..MemFileSystem::default()
        }
    }

    /// Seed a file so `read`/`stat` can find it.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.lock().insert(path.into(), content.into());
    }

    /// Snapshot of the file at `path`, if written.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().get(path.as_ref()).cloned()
    }

    /// Paths of all files present, sorted.
    pub fn file_names(&self) -> Vec<PathBuf> {
        let mut names: Vec<PathBuf> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemFileSystem {
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        if self.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "open rejected by test double",
            ));
        }
        Ok(Box::new(MemWriter {
            path: path.to_path_buf(),
            files: Arc::clone(&self.files),
            buf: Vec::new(),
            fail: self.fail_write,
        }))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.lock()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let size = self
            .lock()
            .get(path)
            .map(|content| content.len() as u64)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
        Ok(FileInfo {
            size,
            modified: 0,
            mode: 0o644,
            is_dir: false,
        })
    }
}

struct MemWriter {
    path: PathBuf,
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    buf: Vec<u8>,
    fail: bool,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write rejected by test double",
            ));
        }
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MemWriter {
    fn drop(&mut self) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(std::mem::take(&mut self.path), std::mem::take(&mut self.buf));
    }
}
