//! Driver traits shared by the registry, the dispatcher, and the built-in drivers.
//!
//! A driver is described by its name, the file extensions it claims, and the
//! modes it supports; opening it produces an instance over a [`ByteStream`].
//! There are two independent families:
//!
//! - [`FormatDriver`] - decodes and encodes records, producing a [`RecordStream`]
//! - [`CompressionDriver`] - wraps a byte stream, producing another [`ByteStream`]
//!
//! The dispatcher layers them: raw resource, then compression (optional), then
//! format. Neither family knows the other's concrete types; they meet only at
//! the [`ByteStream`] trait.
//!
//! # Implementing a driver
//!
//! ```
//! use recordio::driver::{CompressionDriver, Family};
//! use recordio::io::stream::ByteStream;
//! use recordio::{DriverOptions, Mode, Result};
//!
//! struct Passthrough;
//!
//! impl CompressionDriver for Passthrough {
//!     fn name(&self) -> &str { "passthrough" }
//!     fn extensions(&self) -> &[&str] { &["raw"] }
//!     fn open(
//!         &self,
//!         stream: Box<dyn ByteStream>,
//!         _mode: Mode,
//!         _options: &DriverOptions,
//!     ) -> Result<Box<dyn ByteStream>> {
//!         Ok(stream)
//!     }
//! }
//! ```

use crate::error::Result;
use crate::io::stream::ByteStream;
use crate::mode::Mode;
use crate::options::DriverOptions;
use crate::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The two independent driver families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Format,
    Compression,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Format => f.write_str("format"),
            Family::Compression => f.write_str("compression"),
        }
    }
}

/// A record-level driver.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` as they're stored in a global registry
/// and may be looked up from multiple threads.
pub trait FormatDriver: Send + Sync {
    /// Unique name within the format family (e.g., "newlinejson").
    fn name(&self) -> &str;

    /// Lowercase file extensions without the leading dot (e.g., `&["json"]`).
    fn extensions(&self) -> &[&str];

    /// Modes this driver can be opened with.
    fn modes(&self) -> &[Mode] {
        &Mode::ALL
    }

    /// Reject unknown or ill-typed options before any resource is opened.
    fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
        crate::options::ensure_known(self.name(), options, &[])
    }

    /// Open an instance over `stream`, which the instance then owns.
    fn open(
        &self,
        stream: Box<dyn ByteStream>,
        mode: Mode,
        options: &DriverOptions,
    ) -> Result<Box<dyn RecordStream>>;
}

/// A byte-level driver layered beneath a format driver.
///
/// Same thread-safety requirements as [`FormatDriver`].
pub trait CompressionDriver: Send + Sync {
    /// Unique name within the compression family (e.g., "gzip").
    fn name(&self) -> &str;

    /// Lowercase file extensions without the leading dot (e.g., `&["gz"]`).
    fn extensions(&self) -> &[&str];

    /// Modes this driver can be opened with.
    fn modes(&self) -> &[Mode] {
        &Mode::ALL
    }

    /// Reject unknown or ill-typed options before any resource is opened.
    fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
        crate::options::ensure_known(self.name(), options, &[])
    }

    /// Wrap `stream` so reads decompress and writes compress.
    fn open(
        &self,
        stream: Box<dyn ByteStream>,
        mode: Mode,
        options: &DriverOptions,
    ) -> Result<Box<dyn ByteStream>>;
}

/// An open format driver instance.
///
/// Reads yield records in the order they were written. Once closed, every
/// read or write fails with [`Error::ClosedStream`](crate::Error::ClosedStream).
pub trait RecordStream: Send {
    /// The mode this instance was opened with.
    fn mode(&self) -> Mode;

    /// Decode the next record, or `None` at the end of the stream.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Encode and append one record.
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Push buffered bytes down to the underlying stream.
    fn flush(&mut self) -> Result<()>;

    /// Close this instance and every layer beneath it. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

impl fmt::Debug for dyn FormatDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDriver")
            .field("name", &self.name())
            .field("extensions", &self.extensions())
            .field("modes", &self.modes())
            .finish()
    }
}

impl fmt::Debug for dyn CompressionDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionDriver")
            .field("name", &self.name())
            .field("extensions", &self.extensions())
            .field("modes", &self.modes())
            .finish()
    }
}

/// A registered driver of either family.
#[derive(Clone)]
pub enum Driver {
    Format(Arc<dyn FormatDriver>),
    Compression(Arc<dyn CompressionDriver>),
}

impl Driver {
    #[must_use]
    pub fn family(&self) -> Family {
        match self {
            Driver::Format(_) => Family::Format,
            Driver::Compression(_) => Family::Compression,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Driver::Format(d) => d.name(),
            Driver::Compression(d) => d.name(),
        }
    }

    #[must_use]
    pub fn extensions(&self) -> &[&str] {
        match self {
            Driver::Format(d) => d.extensions(),
            Driver::Compression(d) => d.extensions(),
        }
    }

    #[must_use]
    pub fn modes(&self) -> &[Mode] {
        match self {
            Driver::Format(d) => d.modes(),
            Driver::Compression(d) => d.modes(),
        }
    }

    /// `true` when both handles point at the same registered driver.
    #[must_use]
    pub fn ptr_eq(&self, other: &Driver) -> bool {
        match (self, other) {
            (Driver::Format(a), Driver::Format(b)) => Arc::ptr_eq(a, b),
            (Driver::Compression(a), Driver::Compression(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Format(d) => fmt::Debug::fmt(d, f),
            Driver::Compression(d) => fmt::Debug::fmt(d, f),
        }
    }
}

impl From<Arc<dyn FormatDriver>> for Driver {
    fn from(driver: Arc<dyn FormatDriver>) -> Self {
        Driver::Format(driver)
    }
}

impl From<Arc<dyn CompressionDriver>> for Driver {
    fn from(driver: Arc<dyn CompressionDriver>) -> Self {
        Driver::Compression(driver)
    }
}
