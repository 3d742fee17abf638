//! Byte streams: the seam between compression drivers and format drivers.
//!
//! [`ByteStream`] is the minimal interface every layer exposes to the layer
//! above it. Raw resources are adapted with [`ReadStream`] and [`WriteStream`];
//! compression drivers return their own implementations.

use crate::error::{Error, Result};
use crate::mode::Mode;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// An open byte stream owned by exactly one layer.
///
/// `close` releases the stream and everything beneath it. It must be
/// idempotent, and reads or writes after it must fail rather than no-op.
pub trait ByteStream: Read + Write + Send {
    /// The mode this stream was opened with.
    fn mode(&self) -> Mode;

    /// Flush pending output and release the resource.
    fn close(&mut self) -> io::Result<()>;

    fn is_closed(&self) -> bool;
}

pub(crate) fn closed_error() -> io::Error {
    io::Error::other("I/O operation on closed stream")
}

pub(crate) fn unsupported(mode: Mode, operation: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{operation} on a stream opened in mode '{mode}'"),
    )
}

/// Read-only adapter over any [`Read`].
pub struct ReadStream<R> {
    inner: Option<R>,
}

impl<R: Read + Send> ReadStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }
}

impl<R: Read + Send> Read for ReadStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(r) => r.read(buf),
            None => Err(closed_error()),
        }
    }
}

impl<R: Read + Send> Write for ReadStream<R> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(unsupported(Mode::Read, "write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<R: Read + Send> ByteStream for ReadStream<R> {
    fn mode(&self) -> Mode {
        Mode::Read
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner = None;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Write-only adapter over any [`Write`], in write or append mode.
pub struct WriteStream<W> {
    inner: Option<W>,
    mode: Mode,
}

impl<W: Write + Send> WriteStream<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            mode: Mode::Write,
        }
    }

    /// Same as [`WriteStream::new`] but reports [`Mode::Append`].
    pub fn appending(inner: W) -> Self {
        Self {
            inner: Some(inner),
            mode: Mode::Append,
        }
    }
}

impl<W: Write + Send> Read for WriteStream<W> {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported(self.mode, "read"))
    }
}

impl<W: Write + Send> Write for WriteStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(w) => w.write(buf),
            None => Err(closed_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(w) => w.flush(),
            None => Err(closed_error()),
        }
    }
}

impl<W: Write + Send> ByteStream for WriteStream<W> {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn close(&mut self) -> io::Result<()> {
        match self.inner.take() {
            Some(mut w) => w.flush(),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Open the raw file behind `path` for `mode`.
///
/// Write mode truncates; append mode creates the file if missing. Parent
/// directories are created as needed for both.
pub fn open_path(path: impl AsRef<Path>, mode: Mode) -> Result<Box<dyn ByteStream>> {
    let path = path.as_ref();
    let opened = match mode {
        Mode::Read => File::open(path).map(|f| Box::new(ReadStream::new(f)) as Box<dyn ByteStream>),
        Mode::Write | Mode::Append => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                create_dir_all(parent).map_err(|source| Error::Open {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            if mode == Mode::Write {
                File::create(path)
                    .map(|f| Box::new(WriteStream::new(BufWriter::new(f))) as Box<dyn ByteStream>)
            } else {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map(|f| {
                        Box::new(WriteStream::appending(BufWriter::new(f))) as Box<dyn ByteStream>
                    })
            }
        }
    };
    opened.map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}
