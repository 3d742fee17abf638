//! Helpers for command-line front ends.
//!
//! Argument parsing itself belongs to the front end; these functions give it
//! consistent semantics for the common options:
//!
//! - driver and compression choice lists ([`choices`])
//! - repeated `NAME=VAL` driver options with JSON-decoded values ([`parse_options`])
//! - `--indent N` / `--indent none` for pretty output ([`parse_indent`], [`render_record`])

use crate::driver::Family;
use crate::error::{Error, Result};
use crate::options::DriverOptions;
use crate::registry;
use crate::Record;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Indentation used for pretty output when none is given.
pub const DEFAULT_INDENT: usize = 4;

/// Allowed values for a driver or compression name option.
///
/// Registered names come sorted; compression choices end with `none`, which
/// disables the layer.
pub fn choices(family: Family) -> Result<Vec<String>> {
    let mut names = registry::names(family)?;
    if family == Family::Compression {
        names.push("none".to_string());
    }
    Ok(names)
}

/// Split `NAME=VAL`, decoding `VAL` as JSON when possible.
///
/// `level=9` yields a number, `skip_failures=true` a boolean, and `name=ais`
/// stays the string `"ais"`.
pub fn parse_key_val(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| Error::InvalidArgument {
        argument: raw.to_string(),
        reason: "expected NAME=VAL".to_string(),
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidArgument {
            argument: raw.to_string(),
            reason: "option name is empty".to_string(),
        });
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Collect repeated `NAME=VAL` arguments into driver options; later keys win.
pub fn parse_options<I, S>(args: I) -> Result<DriverOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = DriverOptions::new();
    for arg in args {
        let (key, value) = parse_key_val(arg.as_ref())?;
        options.insert(key, value);
    }
    Ok(options)
}

/// Parse an indent option: an integer, or `none` to disable pretty printing.
pub fn parse_indent(raw: &str) -> Result<Option<usize>> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    trimmed
        .parse::<usize>()
        .map(Some)
        .map_err(|_| Error::InvalidArgument {
            argument: raw.to_string(),
            reason: "must be `none` or an integer".to_string(),
        })
}

/// Render a record as JSON, pretty printed with `indent` spaces when given.
pub fn render_record(record: &Record, indent: Option<usize>) -> Result<String> {
    let Some(width) = indent else {
        return serde_json::to_string(record).map_err(|e| Error::encode("json", 1, e));
    };
    let spaces = vec![b' '; width];
    let mut out = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&spaces));
    record
        .serialize(&mut ser)
        .map_err(|e| Error::encode("json", 1, e))?;
    String::from_utf8(out).map_err(|e| Error::encode("json", 1, e))
}
