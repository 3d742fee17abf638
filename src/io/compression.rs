//! Pluggable compression drivers for transparent record I/O.
//!
//! A compression driver wraps the raw [`ByteStream`] of a file so the format
//! driver above it reads decompressed bytes and writes bytes that get
//! compressed on the way down.
//!
//! ## Built-in Drivers
//!
//! When enabled via feature flags, the following drivers are registered:
//! - **gzip** (`.gz`, `.gzip`) - via `flate2` crate (feature: `compression-gzip`)
//! - **zstd** (`.zst`, `.zstd`) - via `zstd` crate (feature: `compression-zstd`)
//! - **bzip2** (`.bz2`, `.bzip2`) - via `bzip2` crate (feature: `compression-bzip2`)
//! - **xz** (`.xz`) - via `xz2` crate (feature: `compression-xz`)
//!
//! All of them accept a `level` option and support append mode: appending
//! adds a new member/frame and reads decode every member in sequence.
//!
//! ## Custom Drivers
//!
//! Implement [`CompressionDriver`] and register it with
//! [`registry::register_compression`](crate::registry::register_compression).
//! A driver built on a decoder/encoder pair can reuse [`CompressedStream`] by
//! implementing [`Decoder`] and [`Encoder`] for its codec types.

use crate::io::stream::{closed_error, unsupported, ByteStream};
use crate::mode::Mode;
use std::io::{self, Read, Write};

#[cfg(any(
    feature = "compression-gzip",
    feature = "compression-zstd",
    feature = "compression-bzip2",
    feature = "compression-xz"
))]
use crate::{
    driver::CompressionDriver,
    error::Result,
    options::{self, DriverOptions},
    registry::Registry,
};

/// A decompressing reader that can give back the stream it wraps.
pub trait Decoder: Read + Send {
    fn release(self: Box<Self>) -> Box<dyn ByteStream>;
}

/// A compressing writer that can write its trailer and give back the stream it wraps.
pub trait Encoder: Write + Send {
    fn finish_layer(self: Box<Self>) -> io::Result<Box<dyn ByteStream>>;
}

enum Layer {
    Decoding(Box<dyn Decoder>),
    Encoding(Box<dyn Encoder>),
    Closed,
}

/// A [`ByteStream`] that decompresses on read or compresses on write.
///
/// Closing an encoding stream writes the codec trailer before closing the
/// stream below it.
pub struct CompressedStream {
    mode: Mode,
    layer: Layer,
}

impl CompressedStream {
    pub fn decoding(decoder: Box<dyn Decoder>) -> Self {
        Self {
            mode: Mode::Read,
            layer: Layer::Decoding(decoder),
        }
    }

    pub fn encoding(encoder: Box<dyn Encoder>, mode: Mode) -> Self {
        Self {
            mode,
            layer: Layer::Encoding(encoder),
        }
    }
}

impl Read for CompressedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.layer {
            Layer::Decoding(d) => d.read(buf),
            Layer::Encoding(_) => Err(unsupported(self.mode, "read")),
            Layer::Closed => Err(closed_error()),
        }
    }
}

impl Write for CompressedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.layer {
            Layer::Encoding(e) => e.write(buf),
            Layer::Decoding(_) => Err(unsupported(self.mode, "write")),
            Layer::Closed => Err(closed_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.layer {
            Layer::Encoding(e) => e.flush(),
            Layer::Decoding(_) => Ok(()),
            Layer::Closed => Err(closed_error()),
        }
    }
}

impl ByteStream for CompressedStream {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn close(&mut self) -> io::Result<()> {
        match std::mem::replace(&mut self.layer, Layer::Closed) {
            Layer::Decoding(d) => d.release().close(),
            Layer::Encoding(e) => e.finish_layer()?.close(),
            Layer::Closed => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        matches!(self.layer, Layer::Closed)
    }
}

#[cfg(any(
    feature = "compression-gzip",
    feature = "compression-zstd",
    feature = "compression-bzip2",
    feature = "compression-xz"
))]
fn level(
    driver: &str,
    opts: &DriverOptions,
    range: std::ops::RangeInclusive<i64>,
) -> Result<Option<i64>> {
    options::ensure_known(driver, opts, &["level"])?;
    options::integer(driver, opts, "level", range)
}

// ============================================================================
// Built-in Driver Implementations
// ============================================================================

#[cfg(feature = "compression-gzip")]
pub use gzip::Gzip;

#[cfg(feature = "compression-gzip")]
mod gzip {
    use super::*;
    use flate2::read::MultiGzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    /// gzip via `flate2`; `level` is 0-9.
    pub struct Gzip;

    const NAME: &str = "gzip";
    const LEVELS: std::ops::RangeInclusive<i64> = 0..=9;

    impl Decoder for MultiGzDecoder<Box<dyn ByteStream>> {
        fn release(self: Box<Self>) -> Box<dyn ByteStream> {
            (*self).into_inner()
        }
    }

    impl Encoder for GzEncoder<Box<dyn ByteStream>> {
        fn finish_layer(self: Box<Self>) -> io::Result<Box<dyn ByteStream>> {
            (*self).finish()
        }
    }

    impl CompressionDriver for Gzip {
        fn name(&self) -> &str {
            NAME
        }

        fn extensions(&self) -> &[&str] {
            &["gz", "gzip"]
        }

        fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
            level(NAME, options, LEVELS).map(|_| ())
        }

        fn open(
            &self,
            stream: Box<dyn ByteStream>,
            mode: Mode,
            options: &DriverOptions,
        ) -> Result<Box<dyn ByteStream>> {
            let level = level(NAME, options, LEVELS)?;
            if mode.is_read() {
                return Ok(Box::new(CompressedStream::decoding(Box::new(
                    MultiGzDecoder::new(stream),
                ))));
            }
            let compression =
                level.map_or_else(Compression::default, |l| Compression::new(l as u32));
            Ok(Box::new(CompressedStream::encoding(
                Box::new(GzEncoder::new(stream, compression)),
                mode,
            )))
        }
    }

    pub fn register(registry: &mut Registry) -> Result<()> {
        registry.register_compression(std::sync::Arc::new(Gzip))
    }
}

#[cfg(feature = "compression-zstd")]
pub use zstd_driver::Zstd;

#[cfg(feature = "compression-zstd")]
mod zstd_driver {
    use super::*;
    use std::io::BufReader;

    /// Zstandard via `zstd`; `level` is 1-22.
    pub struct Zstd;

    const NAME: &str = "zstd";
    const LEVELS: std::ops::RangeInclusive<i64> = 1..=22;
    const DEFAULT_LEVEL: i32 = 3;

    impl Decoder for zstd::stream::read::Decoder<'static, BufReader<Box<dyn ByteStream>>> {
        fn release(self: Box<Self>) -> Box<dyn ByteStream> {
            (*self).finish().into_inner()
        }
    }

    impl Encoder for zstd::stream::write::Encoder<'static, Box<dyn ByteStream>> {
        fn finish_layer(self: Box<Self>) -> io::Result<Box<dyn ByteStream>> {
            (*self).finish()
        }
    }

    impl CompressionDriver for Zstd {
        fn name(&self) -> &str {
            NAME
        }

        fn extensions(&self) -> &[&str] {
            &["zst", "zstd"]
        }

        fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
            level(NAME, options, LEVELS).map(|_| ())
        }

        fn open(
            &self,
            stream: Box<dyn ByteStream>,
            mode: Mode,
            options: &DriverOptions,
        ) -> Result<Box<dyn ByteStream>> {
            let level = level(NAME, options, LEVELS)?;
            if mode.is_read() {
                let decoder = zstd::stream::read::Decoder::new(stream)?;
                return Ok(Box::new(CompressedStream::decoding(Box::new(decoder))));
            }
            let level = level.map_or(DEFAULT_LEVEL, |l| l as i32);
            let encoder = zstd::stream::write::Encoder::new(stream, level)?;
            Ok(Box::new(CompressedStream::encoding(Box::new(encoder), mode)))
        }
    }

    pub fn register(registry: &mut Registry) -> Result<()> {
        registry.register_compression(std::sync::Arc::new(Zstd))
    }
}

#[cfg(feature = "compression-bzip2")]
pub use bzip2_driver::Bzip2;

#[cfg(feature = "compression-bzip2")]
mod bzip2_driver {
    use super::*;
    use bzip2::read::MultiBzDecoder;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;

    /// bzip2 via `bzip2`; `level` is 1-9.
    pub struct Bzip2;

    const NAME: &str = "bzip2";
    const LEVELS: std::ops::RangeInclusive<i64> = 1..=9;

    impl Decoder for MultiBzDecoder<Box<dyn ByteStream>> {
        fn release(self: Box<Self>) -> Box<dyn ByteStream> {
            (*self).into_inner()
        }
    }

    impl Encoder for BzEncoder<Box<dyn ByteStream>> {
        fn finish_layer(self: Box<Self>) -> io::Result<Box<dyn ByteStream>> {
            (*self).finish()
        }
    }

    impl CompressionDriver for Bzip2 {
        fn name(&self) -> &str {
            NAME
        }

        fn extensions(&self) -> &[&str] {
            &["bz2", "bzip2"]
        }

        fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
            level(NAME, options, LEVELS).map(|_| ())
        }

        fn open(
            &self,
            stream: Box<dyn ByteStream>,
            mode: Mode,
            options: &DriverOptions,
        ) -> Result<Box<dyn ByteStream>> {
            let level = level(NAME, options, LEVELS)?;
            if mode.is_read() {
                return Ok(Box::new(CompressedStream::decoding(Box::new(
                    MultiBzDecoder::new(stream),
                ))));
            }
            let compression =
                level.map_or_else(Compression::default, |l| Compression::new(l as u32));
            Ok(Box::new(CompressedStream::encoding(
                Box::new(BzEncoder::new(stream, compression)),
                mode,
            )))
        }
    }

    pub fn register(registry: &mut Registry) -> Result<()> {
        registry.register_compression(std::sync::Arc::new(Bzip2))
    }
}

#[cfg(feature = "compression-xz")]
pub use xz_driver::Xz;

#[cfg(feature = "compression-xz")]
mod xz_driver {
    use super::*;
    use xz2::read::XzDecoder;
    use xz2::write::XzEncoder;

    /// xz via `xz2`; `level` is 0-9.
    pub struct Xz;

    const NAME: &str = "xz";
    const LEVELS: std::ops::RangeInclusive<i64> = 0..=9;
    const DEFAULT_LEVEL: u32 = 6;

    impl Decoder for XzDecoder<Box<dyn ByteStream>> {
        fn release(self: Box<Self>) -> Box<dyn ByteStream> {
            (*self).into_inner()
        }
    }

    impl Encoder for XzEncoder<Box<dyn ByteStream>> {
        fn finish_layer(self: Box<Self>) -> io::Result<Box<dyn ByteStream>> {
            (*self).finish()
        }
    }

    impl CompressionDriver for Xz {
        fn name(&self) -> &str {
            NAME
        }

        fn extensions(&self) -> &[&str] {
            &["xz"]
        }

        fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
            level(NAME, options, LEVELS).map(|_| ())
        }

        fn open(
            &self,
            stream: Box<dyn ByteStream>,
            mode: Mode,
            options: &DriverOptions,
        ) -> Result<Box<dyn ByteStream>> {
            let level = level(NAME, options, LEVELS)?;
            if mode.is_read() {
                return Ok(Box::new(CompressedStream::decoding(Box::new(
                    XzDecoder::new_multi_decoder(stream),
                ))));
            }
            let level = level.map_or(DEFAULT_LEVEL, |l| l as u32);
            Ok(Box::new(CompressedStream::encoding(
                Box::new(XzEncoder::new(stream, level)),
                mode,
            )))
        }
    }

    pub fn register(registry: &mut Registry) -> Result<()> {
        registry.register_compression(std::sync::Arc::new(Xz))
    }
}

/// Register every compression driver enabled at build time.
#[cfg(any(
    feature = "compression-gzip",
    feature = "compression-zstd",
    feature = "compression-bzip2",
    feature = "compression-xz"
))]
pub(crate) fn register_builtins(registry: &mut Registry) -> Result<()> {
    #[cfg(feature = "compression-gzip")]
    gzip::register(registry)?;
    #[cfg(feature = "compression-zstd")]
    zstd_driver::register(registry)?;
    #[cfg(feature = "compression-bzip2")]
    bzip2_driver::register(registry)?;
    #[cfg(feature = "compression-xz")]
    xz_driver::register(registry)?;
    Ok(())
}
