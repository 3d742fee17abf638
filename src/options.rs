//! Per-driver key/value options.
//!
//! Options arrive as a JSON object (typically decoded from `NAME=VAL` pairs on
//! the command line, see [`cli::parse_options`](crate::cli::parse_options)).
//! Drivers read them with the typed accessors below, which report unknown keys
//! and wrong types as [`Error::InvalidOption`].

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

/// Options handed to a driver's `open`.
pub type DriverOptions = Map<String, Value>;

/// Fail on the first key not listed in `known`.
pub fn ensure_known(driver: &str, options: &DriverOptions, known: &[&str]) -> Result<()> {
    match options.keys().find(|k| !known.contains(&k.as_str())) {
        Some(key) if known.is_empty() => Err(Error::invalid_option(
            driver,
            key.as_str(),
            "driver takes no options",
        )),
        Some(key) => Err(Error::invalid_option(
            driver,
            key.as_str(),
            format!("expected one of: {}", known.join(", ")),
        )),
        None => Ok(()),
    }
}

/// Read an optional boolean option.
pub fn flag(driver: &str, options: &DriverOptions, key: &str) -> Result<Option<bool>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::invalid_option(
            driver,
            key,
            format!("expected a boolean, got {other}"),
        )),
    }
}

/// Read an optional integer option constrained to `range`.
pub fn integer(
    driver: &str,
    options: &DriverOptions,
    key: &str,
    range: RangeInclusive<i64>,
) -> Result<Option<i64>> {
    let value = match options.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let n = value.as_i64().ok_or_else(|| {
        Error::invalid_option(driver, key, format!("expected an integer, got {value}"))
    })?;
    if !range.contains(&n) {
        return Err(Error::invalid_option(
            driver,
            key,
            format!("{n} is outside {}..={}", range.start(), range.end()),
        ));
    }
    Ok(Some(n))
}
