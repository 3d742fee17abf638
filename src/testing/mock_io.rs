//! Mock I/O helpers for testing without touching real files.
//!
//! Besides temporary files and directories, this module provides in-memory
//! [`ByteStream`]s that report to a [`HandleTracker`], so a test can assert
//! that every stream a driver opened was also released.

use crate::io::stream::ByteStream;
use crate::mode::Mode;
use crate::Record;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::{NamedTempFile, TempDir};

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file with a specific extension, e.g. `"json.gz"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    /// Get the path to the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

/// Create a temporary file with the given extension holding `records`,
/// written through the drivers the extension selects.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```
/// use recordio::testing::{mock_record_file, sample_records};
///
/// let temp = mock_record_file("json.gz", &sample_records()).unwrap();
/// assert_eq!(recordio::read_all(temp.path()).unwrap(), sample_records());
/// ```
pub fn mock_record_file(extension: &str, records: &[Record]) -> crate::Result<TempFilePath> {
    let temp = TempFilePath::with_extension(extension)?;
    crate::write_all(temp.path(), records)?;
    Ok(temp)
}

/// A byte buffer shared between a writing stream and the test inspecting it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn extend(&self, bytes: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
    }
}

/// Counts in-memory streams opened and still open.
#[derive(Clone, Default)]
pub struct HandleTracker {
    open: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl HandleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams created and not yet closed or dropped.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Streams created over the tracker's lifetime.
    #[must_use]
    pub fn total_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn track(&self, mode: Mode, backing: Backing) -> TrackedStream {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        TrackedStream {
            mode,
            backing,
            tracker: self.clone(),
            closed: false,
        }
    }

    /// A read stream over `bytes`.
    #[must_use]
    pub fn reader(&self, bytes: Vec<u8>) -> TrackedStream {
        self.track(Mode::Read, Backing::Reading(Cursor::new(bytes)))
    }

    /// A write stream appending to `buffer`, reporting `mode` (write or append).
    #[must_use]
    pub fn writer(&self, buffer: &SharedBuffer, mode: Mode) -> TrackedStream {
        self.track(mode, Backing::Writing(buffer.clone()))
    }
}

enum Backing {
    Reading(Cursor<Vec<u8>>),
    Writing(SharedBuffer),
}

/// An in-memory [`ByteStream`] registered with a [`HandleTracker`].
pub struct TrackedStream {
    mode: Mode,
    backing: Backing,
    tracker: HandleTracker,
    closed: bool,
}

impl TrackedStream {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.tracker.open.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn check_open(&self) -> io::Result<()> {
        if self.closed {
            Err(io::Error::other("I/O operation on closed stream"))
        } else {
            Ok(())
        }
    }
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open()?;
        match &mut self.backing {
            Backing::Reading(cursor) => cursor.read(buf),
            Backing::Writing(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "read on a write stream",
            )),
        }
    }
}

impl Write for TrackedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        match &self.backing {
            Backing::Writing(buffer) => {
                buffer.extend(buf);
                Ok(buf.len())
            }
            Backing::Reading(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "write on a read stream",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_open()
    }
}

impl ByteStream for TrackedStream {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn close(&mut self) -> io::Result<()> {
        self.release();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.release();
    }
}
