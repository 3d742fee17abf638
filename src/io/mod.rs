pub mod compression;
pub mod stream;

#[cfg_attr(docsrs, doc(cfg(feature = "format-jsonl")))]
#[cfg(feature = "format-jsonl")]
pub mod jsonl;

#[cfg_attr(docsrs, doc(cfg(feature = "format-msgpack")))]
#[cfg(feature = "format-msgpack")]
pub mod msgpack;

use crate::error::{Error, Result};
use crate::mode::Mode;
use stream::ByteStream;
use std::io::{BufReader, Write};

/// The stream a format driver instance owns, in the shape its mode needs.
///
/// Reading instances buffer the stream so codecs can peek for end of input;
/// writing instances write through, leaving buffering to the layer below.
pub(crate) enum Endpoint {
    Reading(BufReader<Box<dyn ByteStream>>),
    Writing(Box<dyn ByteStream>),
    Closed,
}

impl Endpoint {
    pub(crate) fn new(stream: Box<dyn ByteStream>, mode: Mode) -> Self {
        if mode.is_read() {
            Endpoint::Reading(BufReader::new(stream))
        } else {
            Endpoint::Writing(stream)
        }
    }

    pub(crate) fn reader(
        &mut self,
        driver: &str,
        mode: Mode,
    ) -> Result<&mut BufReader<Box<dyn ByteStream>>> {
        match self {
            Endpoint::Reading(r) => Ok(r),
            Endpoint::Writing(_) => Err(Error::unsupported_operation(driver, "read", mode)),
            Endpoint::Closed => Err(Error::closed(driver)),
        }
    }

    pub(crate) fn writer(&mut self, driver: &str, mode: Mode) -> Result<&mut Box<dyn ByteStream>> {
        match self {
            Endpoint::Writing(w) => Ok(w),
            Endpoint::Reading(_) => Err(Error::unsupported_operation(driver, "write", mode)),
            Endpoint::Closed => Err(Error::closed(driver)),
        }
    }

    pub(crate) fn flush(&mut self, driver: &str) -> Result<()> {
        match self {
            Endpoint::Writing(w) => Ok(w.flush()?),
            Endpoint::Reading(_) => Ok(()),
            Endpoint::Closed => Err(Error::closed(driver)),
        }
    }

    /// Close the owned stream. The endpoint is closed afterwards even if this fails.
    pub(crate) fn close(&mut self) -> Result<()> {
        match std::mem::replace(self, Endpoint::Closed) {
            Endpoint::Reading(r) => Ok(r.into_inner().close()?),
            Endpoint::Writing(mut w) => Ok(w.close()?),
            Endpoint::Closed => Ok(()),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(self, Endpoint::Closed)
    }
}
