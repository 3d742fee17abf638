//! Driver resolution and layered stream assembly.
//!
//! Given a path (or a bare stream) and optional explicit driver names, the
//! dispatcher picks a format driver and an optional compression driver,
//! validates the mode against both, and assembles
//! `raw resource -> compression layer -> format layer` into a [`RecordFile`].
//!
//! ## Detection
//!
//! Only the file name's trailing `.`-separated tokens are considered:
//!
//! | path            | compression | format        |
//! |-----------------|-------------|---------------|
//! | `ais.json`      | none        | `newlinejson` |
//! | `ais.json.gz`   | `gzip`      | `newlinejson` |
//! | `ais.msgpack`   | none        | `msgpack`     |
//! | `ais.unknown`   | none        | error         |
//!
//! Explicit names bypass detection for their own family only; the compression
//! name `none` disables the compression layer.
//!
//! # Examples
//! ```no_run
//! use recordio::{open, Mode, OpenOptions};
//!
//! # fn main() -> recordio::Result<()> {
//! // Detected from the path: gzip beneath newline JSON.
//! for record in open("ais.json.gz", Mode::Read)? {
//!     let record = record?;
//!     println!("{}", record["mmsi"]);
//! }
//!
//! // Explicit drivers and options.
//! let mut out = OpenOptions::new(Mode::Write)
//!     .driver("msgpack")
//!     .compression("zstd")
//!     .compression_option("level", 9)
//!     .open("ais.bin")?;
//! out.close()?;
//! # Ok(())
//! # }
//! ```

use crate::driver::{CompressionDriver, FormatDriver, RecordStream};
use crate::error::{Error, Result};
use crate::io::stream::{open_path, ByteStream};
use crate::metrics::{self, MetricsCollector};
use crate::mode::Mode;
use crate::options::DriverOptions;
use crate::registry::{self, Registry};
use crate::Record;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// How the compression layer is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompressionChoice {
    /// Detect from the path's last extension.
    #[default]
    Detect,
    /// No compression layer, whatever the path says.
    Disabled,
    /// Use the named compression driver.
    Named(String),
}

impl From<&str> for CompressionChoice {
    /// `"none"` (any case) disables compression; anything else is a driver name.
    fn from(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("none") {
            CompressionChoice::Disabled
        } else {
            CompressionChoice::Named(name.to_string())
        }
    }
}

impl From<String> for CompressionChoice {
    fn from(name: String) -> Self {
        CompressionChoice::from(name.as_str())
    }
}

impl<T: Into<CompressionChoice>> From<Option<T>> for CompressionChoice {
    /// `None` means detect.
    fn from(name: Option<T>) -> Self {
        name.map_or(CompressionChoice::Detect, Into::into)
    }
}

/// The drivers a path or explicit names resolved to.
#[derive(Clone)]
pub struct Resolved {
    pub format: Arc<dyn FormatDriver>,
    pub compression: Option<Arc<dyn CompressionDriver>>,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("format", &self.format.name())
            .field("compression", &self.compression.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl Resolved {
    /// Fail with [`Error::UnsupportedMode`] unless both layers support `mode`.
    pub fn ensure_mode(&self, mode: Mode) -> Result<()> {
        if let Some(compression) = &self.compression
            && !compression.modes().contains(&mode)
        {
            return Err(Error::unsupported_mode(
                compression.name(),
                mode,
                compression.modes(),
            ));
        }
        if !self.format.modes().contains(&mode) {
            return Err(Error::unsupported_mode(
                self.format.name(),
                mode,
                self.format.modes(),
            ));
        }
        Ok(())
    }
}

/// The last two `.`-separated tokens of the file name, lowercased, last first.
fn suffix_tokens(path: &Path) -> (String, Option<String>) {
    let name = path
        .file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
    let mut tokens = name.rsplit('.').map(str::to_lowercase);
    let last = tokens.next().unwrap_or_default();
    (last, tokens.next())
}

impl Registry {
    /// The compression driver named by the path's last extension, if any.
    ///
    /// A file name without a `.` never has a compression layer.
    pub fn detect_compression(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<Arc<dyn CompressionDriver>>> {
        match suffix_tokens(path.as_ref()) {
            (last, Some(_)) if self.is_compression_extension(&last) => {
                self.compression_for_extension(&last).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// The format driver for the path, skipping a trailing compression extension.
    ///
    /// # Errors
    /// [`Error::UndetectableFormat`] naming the token no format driver claims.
    pub fn detect_format(&self, path: impl AsRef<Path>) -> Result<Arc<dyn FormatDriver>> {
        let token = match suffix_tokens(path.as_ref()) {
            (last, Some(previous)) if self.is_compression_extension(&last) => previous,
            (last, _) => last,
        };
        self.format_for_extension(&token)
            .map_err(|_| Error::UndetectableFormat { token })
    }

    /// Detect both layers from a path.
    pub fn detect(&self, path: impl AsRef<Path>) -> Result<Resolved> {
        let path = path.as_ref();
        Ok(Resolved {
            format: self.detect_format(path)?,
            compression: self.detect_compression(path)?,
        })
    }
}

/// Detect the format driver for `path` in the global registry.
pub fn detect_format(path: impl AsRef<Path>) -> Result<Arc<dyn FormatDriver>> {
    registry::with_registry(|r| r.detect_format(path))
}

/// Detect the compression driver for `path` in the global registry.
pub fn detect_compression(path: impl AsRef<Path>) -> Result<Option<Arc<dyn CompressionDriver>>> {
    registry::with_registry(|r| r.detect_compression(path))
}

/// Options and flags which can be used to configure how a record file is opened.
///
/// Defaults: read mode, format and compression detected from the path, no
/// driver options, the global registry, no metrics.
#[derive(Clone, Default)]
pub struct OpenOptions {
    mode: Mode,
    driver: Option<String>,
    compression: CompressionChoice,
    driver_options: DriverOptions,
    compression_options: DriverOptions,
    registry: Option<Registry>,
    metrics: Option<MetricsCollector>,
}

impl OpenOptions {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Use the named format driver instead of detecting it.
    #[must_use]
    pub fn driver(mut self, name: impl Into<String>) -> Self {
        self.driver = Some(name.into());
        self
    }

    /// Choose the compression layer; accepts a name, `"none"`, or a [`CompressionChoice`].
    #[must_use]
    pub fn compression(mut self, choice: impl Into<CompressionChoice>) -> Self {
        self.compression = choice.into();
        self
    }

    #[must_use]
    pub fn driver_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.driver_options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn driver_options(mut self, options: DriverOptions) -> Self {
        self.driver_options.extend(options);
        self
    }

    #[must_use]
    pub fn compression_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compression_options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn compression_options(mut self, options: DriverOptions) -> Self {
        self.compression_options.extend(options);
        self
    }

    /// Resolve drivers against `registry` instead of the global one.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Count opens, closes, and records through `collector`.
    #[must_use]
    pub fn metrics(mut self, collector: MetricsCollector) -> Self {
        self.metrics = Some(collector);
        self
    }

    /// Resolve the format and compression drivers, using `path` for detection.
    ///
    /// Without a path the format driver must be named explicitly.
    pub fn resolve(&self, path: Option<&Path>) -> Result<Resolved> {
        match &self.registry {
            Some(registry) => self.resolve_in(registry, path),
            None => registry::with_registry(|r| self.resolve_in(r, path)),
        }
    }

    fn resolve_in(&self, registry: &Registry, path: Option<&Path>) -> Result<Resolved> {
        let format = match (&self.driver, path) {
            (Some(name), _) => registry.format(name)?,
            (None, Some(path)) => registry.detect_format(path)?,
            (None, None) => {
                return Err(Error::UndetectableFormat {
                    token: String::new(),
                });
            }
        };
        let compression = match (&self.compression, path) {
            (CompressionChoice::Named(name), _) => Some(registry.compression(name)?),
            (CompressionChoice::Detect, Some(path)) => registry.detect_compression(path)?,
            (CompressionChoice::Detect, None) | (CompressionChoice::Disabled, _) => None,
        };
        Ok(Resolved {
            format,
            compression,
        })
    }

    /// Validate mode and options against both drivers. Opens nothing.
    fn prepare(&self, path: Option<&Path>) -> Result<Resolved> {
        let resolved = self.resolve(path)?;
        resolved.ensure_mode(self.mode)?;
        if let Some(compression) = &resolved.compression {
            compression.check_options(self.mode, &self.compression_options)?;
        }
        resolved
            .format
            .check_options(self.mode, &self.driver_options)?;
        Ok(resolved)
    }

    /// Open the file at `path` and layer the resolved drivers over it.
    ///
    /// Mode and options are validated before the file is touched, so a
    /// rejected open never creates or truncates anything.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<RecordFile> {
        let path = path.as_ref();
        let resolved = self.prepare(Some(path))?;
        let raw = open_path(path, self.mode)?;
        self.assemble(resolved, raw)
    }

    /// Layer the resolved drivers over an already open stream.
    ///
    /// `hint` is used for detection the same way a file path is.
    pub fn open_stream(
        &self,
        stream: Box<dyn ByteStream>,
        hint: Option<&Path>,
    ) -> Result<RecordFile> {
        let resolved = self.prepare(hint)?;
        if stream.mode() != self.mode {
            return Err(Error::unsupported_mode(
                "stream",
                self.mode,
                &[stream.mode()],
            ));
        }
        self.assemble(resolved, stream)
    }

    /// Open compression then format over `raw`.
    ///
    /// Every layer takes ownership of the one beneath it, so a layer that
    /// fails to open drops, and thereby releases, everything already opened.
    fn assemble(&self, resolved: Resolved, raw: Box<dyn ByteStream>) -> Result<RecordFile> {
        let stream = match &resolved.compression {
            Some(compression) => compression.open(raw, self.mode, &self.compression_options)?,
            None => raw,
        };
        let inner = resolved
            .format
            .open(stream, self.mode, &self.driver_options)?;
        if let Some(metrics) = &self.metrics {
            metrics.increment_counter(metrics::FILES_OPENED, 1);
        }
        Ok(RecordFile {
            inner,
            driver: resolved.format.name().to_string(),
            compression: resolved.compression.map(|c| c.name().to_string()),
            mode: self.mode,
            metrics: self.metrics.clone(),
            exhausted: false,
            released: false,
        })
    }
}

/// An open, layered record file.
///
/// In read mode it is a finite, non-restartable iterator of records; the
/// iterator ends after the first error. Dropping it closes every layer.
pub struct RecordFile {
    inner: Box<dyn RecordStream>,
    driver: String,
    compression: Option<String>,
    mode: Mode,
    metrics: Option<MetricsCollector>,
    exhausted: bool,
    released: bool,
}

impl RecordFile {
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Name of the format driver.
    #[must_use]
    pub fn driver_name(&self) -> &str {
        &self.driver
    }

    /// Name of the compression driver, if there is a compression layer.
    #[must_use]
    pub fn compression_name(&self) -> Option<&str> {
        self.compression.as_deref()
    }

    fn record_metric(&self, name: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.increment_counter(name, 1);
        }
    }

    /// Decode the next record, or `None` at the end of the file.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        match self.inner.read_record() {
            Ok(Some(record)) => {
                self.record_metric(metrics::RECORDS_READ);
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                if matches!(e, Error::Decode { .. }) {
                    self.record_metric(metrics::DECODE_ERRORS);
                }
                Err(e)
            }
        }
    }

    /// Encode and append one record.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.inner.write_record(record)?;
        self.record_metric(metrics::RECORDS_WRITTEN);
        Ok(())
    }

    /// Write every record in order, returning how many were written.
    pub fn write_all<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> Result<usize> {
        let mut n = 0;
        for record in records {
            self.write_record(record)?;
            n += 1;
        }
        Ok(n)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    /// Close every layer. Calling it again is a no-op.
    ///
    /// A decode error already closes the layers; the close is still counted
    /// once here.
    pub fn close(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let closed = self.inner.close();
        self.record_metric(metrics::FILES_CLOSED);
        closed
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Iterator for RecordFile {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.read_record().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.exhausted = true;
        }
        item
    }
}

impl Drop for RecordFile {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl fmt::Display for RecordFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_closed() { "closed" } else { "open" };
        write!(f, "<{state} driver {}", self.driver)?;
        if let Some(compression) = &self.compression {
            write!(f, "+{compression}")?;
        }
        write!(f, ", mode '{}'>", self.mode)
    }
}

impl fmt::Debug for RecordFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordFile")
            .field("driver", &self.driver)
            .field("compression", &self.compression)
            .field("mode", &self.mode)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Open `path` in `mode` with drivers detected from the path.
pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<RecordFile> {
    OpenOptions::new(mode).open(path)
}

/// Open `path`, hand the file to `f`, and close it afterwards.
///
/// The file is closed even when `f` fails; the error from `f` wins over a
/// close error.
pub fn with_file<T>(
    path: impl AsRef<Path>,
    mode: Mode,
    f: impl FnOnce(&mut RecordFile) -> Result<T>,
) -> Result<T> {
    let mut file = open(path, mode)?;
    let out = f(&mut file);
    let closed = file.close();
    let value = out?;
    closed?;
    Ok(value)
}

/// Read every record of `path`.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    with_file(path, Mode::Read, |file| file.by_ref().collect())
}

/// Write `records` to `path`, replacing its contents. Returns the count written.
pub fn write_all(path: impl AsRef<Path>, records: &[Record]) -> Result<usize> {
    with_file(path, Mode::Write, |file| file.write_all(records))
}
