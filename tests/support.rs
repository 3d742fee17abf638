//! Drivers shared by the integration tests.

#![allow(dead_code)]

use recordio::driver::{CompressionDriver, FormatDriver, RecordStream};
use recordio::io::stream::ByteStream;
use recordio::{DriverOptions, Error, Mode, Registry, Result};
use std::io;
use std::sync::Arc;

/// Compression driver that passes bytes through untouched.
pub struct Passthrough {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub modes: &'static [Mode],
}

impl Passthrough {
    pub fn new(name: &'static str, extensions: &'static [&'static str]) -> Self {
        Self {
            name,
            extensions,
            modes: &Mode::ALL,
        }
    }

    pub fn read_only(name: &'static str, extensions: &'static [&'static str]) -> Self {
        Self {
            name,
            extensions,
            modes: &Mode::READ_ONLY,
        }
    }
}

impl CompressionDriver for Passthrough {
    fn name(&self) -> &str {
        self.name
    }

    fn extensions(&self) -> &[&str] {
        self.extensions
    }

    fn modes(&self) -> &[Mode] {
        self.modes
    }

    fn open(
        &self,
        stream: Box<dyn ByteStream>,
        _mode: Mode,
        _options: &DriverOptions,
    ) -> Result<Box<dyn ByteStream>> {
        Ok(stream)
    }
}

/// Newline JSON under another name, restricted to read mode.
#[cfg(feature = "format-jsonl")]
pub struct ReadOnlyJson;

#[cfg(feature = "format-jsonl")]
impl FormatDriver for ReadOnlyJson {
    fn name(&self) -> &str {
        "readonly-json"
    }

    fn extensions(&self) -> &[&str] {
        &["rojson"]
    }

    fn modes(&self) -> &[Mode] {
        &Mode::READ_ONLY
    }

    fn open(
        &self,
        stream: Box<dyn ByteStream>,
        mode: Mode,
        options: &DriverOptions,
    ) -> Result<Box<dyn RecordStream>> {
        recordio::NewlineJson.open(stream, mode, options)
    }
}

/// Format driver whose `open` always fails after taking the stream.
pub struct FailingFormat;

impl FormatDriver for FailingFormat {
    fn name(&self) -> &str {
        "failing"
    }

    fn extensions(&self) -> &[&str] {
        &["fail"]
    }

    fn open(
        &self,
        _stream: Box<dyn ByteStream>,
        _mode: Mode,
        _options: &DriverOptions,
    ) -> Result<Box<dyn RecordStream>> {
        Err(Error::Io(io::Error::other("format layer refused to open")))
    }
}

/// Write-mode stream whose every write fails.
#[derive(Default)]
pub struct FullDisk {
    closed: bool,
}

impl io::Read for FullDisk {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "write-only"))
    }
}

impl io::Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteStream for FullDisk {
    fn mode(&self) -> Mode {
        Mode::Write
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Built-in drivers plus the test drivers above.
pub fn test_registry() -> Result<Registry> {
    let mut registry = Registry::with_builtins()?;
    registry.register_format(Arc::new(FailingFormat))?;
    #[cfg(feature = "format-jsonl")]
    registry.register_format(Arc::new(ReadOnlyJson))?;
    registry.register_compression(Arc::new(Passthrough::read_only("readonly", &["roz"])))?;
    Ok(registry)
}
