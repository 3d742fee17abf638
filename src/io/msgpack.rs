//! MessagePack format driver.
//!
//! Records are concatenated MessagePack maps with no framing between them.
//! Reading peeks at the buffered stream to tell a clean end of input from a
//! truncated record. Each record is encoded in full before it is written,
//! so a failing stream surfaces as an I/O error rather than an encode error.

use crate::driver::{FormatDriver, RecordStream};
use crate::error::{Error, Result};
use crate::io::stream::ByteStream;
use crate::io::Endpoint;
use crate::mode::Mode;
use crate::options::DriverOptions;
use crate::registry::Registry;
use crate::Record;
use std::io::{BufRead, ErrorKind, Write};
use std::sync::Arc;

const NAME: &str = "msgpack";

/// Driver for `.msgpack` and `.msg` files.
pub struct MsgPack;

impl FormatDriver for MsgPack {
    fn name(&self) -> &str {
        NAME
    }

    fn extensions(&self) -> &[&str] {
        &["msgpack", "msg"]
    }

    fn open(
        &self,
        stream: Box<dyn ByteStream>,
        mode: Mode,
        options: &DriverOptions,
    ) -> Result<Box<dyn RecordStream>> {
        self.check_options(mode, options)?;
        Ok(Box::new(MsgPackStream {
            endpoint: Endpoint::new(stream, mode),
            mode,
            read: 0,
            written: 0,
        }))
    }
}

struct MsgPackStream {
    endpoint: Endpoint,
    mode: Mode,
    read: u64,
    written: u64,
}

impl RecordStream for MsgPackStream {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let reader = self.endpoint.reader(NAME, self.mode)?;
        if reader.fill_buf()?.is_empty() {
            return Ok(None);
        }
        let position = self.read + 1;
        match rmp_serde::from_read::<_, Record>(&mut *reader) {
            Ok(record) => {
                self.read = position;
                Ok(Some(record))
            }
            // A short read is a truncated record; any other read failure
            // belongs to the layers underneath.
            Err(
                rmp_serde::decode::Error::InvalidMarkerRead(e)
                | rmp_serde::decode::Error::InvalidDataRead(e),
            ) if e.kind() != ErrorKind::UnexpectedEof => Err(Error::Io(e)),
            Err(e) => {
                // The decode error is what the caller needs to see.
                let _ = self.endpoint.close();
                Err(Error::decode(NAME, position, e))
            }
        }
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        let writer = self.endpoint.writer(NAME, self.mode)?;
        let position = self.written + 1;
        let bytes = rmp_serde::to_vec(record).map_err(|e| Error::encode(NAME, position, e))?;
        writer.write_all(&bytes)?;
        self.written = position;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.endpoint.flush(NAME)
    }

    fn close(&mut self) -> Result<()> {
        self.endpoint.close()
    }

    fn is_closed(&self) -> bool {
        self.endpoint.is_closed()
    }
}

pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register_format(Arc::new(MsgPack))
}
