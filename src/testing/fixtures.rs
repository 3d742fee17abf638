//! Pre-built records for common testing scenarios.

use crate::Record;
use serde_json::{json, Value};

/// Build a record from a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
///
/// # Example
///
/// ```
/// use recordio::testing::record;
/// use serde_json::json;
///
/// let r = record(json!({"mmsi": 1, "name": "ALPHA"}));
/// assert_eq!(r["name"], "ALPHA");
/// ```
#[must_use]
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

/// Vessel position reports, the shape of data the drivers usually carry.
///
/// Together they exercise integers (including negative), floats, strings,
/// booleans, nulls, arrays, and nested objects.
///
/// # Example
///
/// ```
/// use recordio::testing::sample_records;
///
/// let records = sample_records();
/// assert_eq!(records.len(), 3);
/// ```
#[must_use]
pub fn sample_records() -> Vec<Record> {
    vec![
        record(json!({
            "type": 1,
            "mmsi": 366_053_209,
            "lat": 37.802_118,
            "lon": -122.341_618,
            "sog": 0.0,
            "timestamp": "2014-12-19T15:29:36.479005Z",
        })),
        record(json!({
            "type": 5,
            "mmsi": 477_553_000,
            "shipname": "OCEAN PRIDE",
            "dimensions": {"to_bow": 150, "to_stern": 30},
            "destination": null,
            "draught": 12.5,
        })),
        record(json!({
            "type": 18,
            "mmsi": 338_087_471,
            "accuracy": true,
            "heading": -1,
            "tags": ["class-b", "pleasure"],
            "raim": false,
        })),
    ]
}

/// `n` small records with sequential `id`s, for ordering tests.
#[must_use]
pub fn numbered_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| record(json!({"id": i, "label": format!("record-{i}")})))
        .collect()
}
