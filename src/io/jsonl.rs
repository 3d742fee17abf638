//! Newline-delimited JSON format driver.
//!
//! One JSON object per line. On read, blank and whitespace-only lines are
//! skipped and every other line must decode to a JSON object.
//!
//! # Options
//! - `skip_failures` (bool, default `false`): skip lines that fail to decode
//!   instead of returning [`Error::Decode`].

use crate::driver::{FormatDriver, RecordStream};
use crate::error::{Error, Result};
use crate::io::stream::ByteStream;
use crate::io::Endpoint;
use crate::mode::Mode;
use crate::options::{self, DriverOptions};
use crate::registry::Registry;
use crate::Record;
use std::io::{BufRead, Write};
use std::sync::Arc;

const NAME: &str = "newlinejson";

/// Driver for `.json`, `.jsonl`, `.ndjson` and `.nljson` files.
pub struct NewlineJson;

impl NewlineJson {
    fn skip_failures(opts: &DriverOptions) -> Result<bool> {
        options::ensure_known(NAME, opts, &["skip_failures"])?;
        Ok(options::flag(NAME, opts, "skip_failures")?.unwrap_or(false))
    }
}

impl FormatDriver for NewlineJson {
    fn name(&self) -> &str {
        NAME
    }

    fn extensions(&self) -> &[&str] {
        &["json", "jsonl", "ndjson", "nljson"]
    }

    fn check_options(&self, _mode: Mode, options: &DriverOptions) -> Result<()> {
        Self::skip_failures(options).map(|_| ())
    }

    fn open(
        &self,
        stream: Box<dyn ByteStream>,
        mode: Mode,
        options: &DriverOptions,
    ) -> Result<Box<dyn RecordStream>> {
        let skip_failures = Self::skip_failures(options)?;
        Ok(Box::new(JsonLines {
            endpoint: Endpoint::new(stream, mode),
            mode,
            skip_failures,
            line: Vec::new(),
            line_number: 0,
            written: 0,
        }))
    }
}

/// An open newline JSON stream.
struct JsonLines {
    endpoint: Endpoint,
    mode: Mode,
    skip_failures: bool,
    line: Vec<u8>,
    line_number: u64,
    written: u64,
}

impl RecordStream for JsonLines {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            let reader = self.endpoint.reader(NAME, self.mode)?;
            self.line.clear();
            if reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if self.line.trim_ascii().is_empty() {
                continue;
            }
            match serde_json::from_slice::<Record>(&self.line) {
                Ok(record) => return Ok(Some(record)),
                Err(_) if self.skip_failures => continue,
                Err(e) => {
                    // The decode error is what the caller needs to see.
                    let _ = self.endpoint.close();
                    return Err(Error::decode(NAME, self.line_number, e));
                }
            }
        }
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        let writer = self.endpoint.writer(NAME, self.mode)?;
        let position = self.written + 1;
        serde_json::to_writer(&mut *writer, record).map_err(|e| {
            if e.is_io() {
                Error::Io(e.into())
            } else {
                Error::encode(NAME, position, e)
            }
        })?;
        writer.write_all(b"\n")?;
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
    registry.register_format(Arc::new(NewlineJson))
}
