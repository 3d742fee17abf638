//! # recordio
//!
//! A **pluggable record-stream I/O layer**. Records (JSON objects) are read and
//! written through interchangeable format drivers and compression drivers,
//! chosen by name or detected from a file path's extensions.
//!
//! ## Key Features
//!
//! - **Driver registry** - format and compression drivers looked up by name or extension
//! - **Path detection** - `ais.json.gz` resolves to gzip beneath newline JSON
//! - **Layered streams** - raw file, then compression, then format, closed as one
//! - **Explicit lifecycle** - idempotent `close`, close on drop, scoped [`with_file`]
//! - **Extensible** - register custom drivers next to the built-in ones
//! - **Metrics** - optional counters for opens, closes, and records
//!
//! ## Quick Start
//!
//! ```no_run
//! use recordio::{read_all, write_all, Record};
//! use serde_json::json;
//!
//! # fn main() -> recordio::Result<()> {
//! let record: Record = json!({"mmsi": 123456789, "lat": 42.1, "lon": -70.3})
//!     .as_object()
//!     .cloned()
//!     .unwrap_or_default();
//!
//! write_all("positions.json.gz", &[record.clone()])?;
//! assert_eq!(read_all("positions.json.gz")?, vec![record]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Drivers
//!
//! A [`FormatDriver`](driver::FormatDriver) turns a byte stream into records and
//! back; a [`CompressionDriver`](driver::CompressionDriver) wraps a byte stream.
//! Both declare a name, the extensions they claim, and the [`Mode`]s they support.
//!
//! ### Registry
//!
//! The [`registry`] module keeps the process-wide tables. Built-in drivers are
//! registered on first use; custom drivers are added with
//! [`registry::register`]. Name or extension collisions are errors.
//!
//! ### Dispatch
//!
//! [`OpenOptions`] resolves drivers, validates the mode against both of them
//! before touching the file, and returns a [`RecordFile`]: an iterator of
//! records in read mode, a record sink in write and append mode.
//!
//! ## Built-in Drivers
//!
//! | family      | name          | extensions                      | feature             |
//! |-------------|---------------|---------------------------------|---------------------|
//! | format      | `newlinejson` | `json`, `jsonl`, `ndjson`, `nljson` | `format-jsonl`  |
//! | format      | `msgpack`     | `msgpack`, `msg`                | `format-msgpack`    |
//! | compression | `gzip`        | `gz`, `gzip`                    | `compression-gzip`  |
//! | compression | `zstd`        | `zst`, `zstd`                   | `compression-zstd`  |
//! | compression | `bzip2`       | `bz2`, `bzip2`                  | `compression-bzip2` |
//! | compression | `xz`          | `xz`                            | `compression-xz`    |
//!
//! All features are enabled by default.
//!
//! ## Module Overview
//!
//! - [`driver`] - driver traits and the [`Family`](driver::Family) enum
//! - [`registry`] - name and extension tables, global registration
//! - [`dispatch`] - detection, layering, and [`RecordFile`]
//! - [`io`] - byte streams and the built-in drivers
//! - [`options`] - typed access to per-driver options
//! - [`metrics`] - counters for driver activity
//! - [`cli`] - helpers for command-line front ends
//! - [`testing`] - fixtures and mock streams for tests

pub mod cli;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod io;
pub mod metrics;
pub mod mode;
pub mod options;
pub mod registry;
pub mod testing;

/// A record: an object of string keys to JSON values.
pub type Record = serde_json::Map<String, serde_json::Value>;

// General re-exports
pub use dispatch::{
    detect_compression, detect_format, open, read_all, with_file, write_all, CompressionChoice,
    OpenOptions, RecordFile, Resolved,
};
pub use driver::{CompressionDriver, Driver, Family, FormatDriver, RecordStream};
pub use error::{Error, Result};
pub use io::stream::ByteStream;
pub use mode::Mode;
pub use options::DriverOptions;
pub use registry::Registry;

// Gated re-exports
#[cfg(feature = "format-jsonl")]
pub use io::jsonl::NewlineJson;

#[cfg(feature = "format-msgpack")]
pub use io::msgpack::MsgPack;

#[cfg(feature = "compression-gzip")]
pub use io::compression::Gzip;

#[cfg(feature = "compression-zstd")]
pub use io::compression::Zstd;

#[cfg(feature = "compression-bzip2")]
pub use io::compression::Bzip2;

#[cfg(feature = "compression-xz")]
pub use io::compression::Xz;
