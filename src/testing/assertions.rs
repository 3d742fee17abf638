//! Assertion functions for record sequences and record files.

use crate::Record;
use std::path::Path;

/// Assert that two record sequences are equal in order and content.
///
/// # Panics
///
/// Panics if the sequences differ in length or content.
///
/// # Example
///
/// ```
/// use recordio::testing::{assert_records_equal, sample_records};
///
/// assert_records_equal(&sample_records(), &sample_records());
/// ```
pub fn assert_records_equal(actual: &[Record], expected: &[Record]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Record count mismatch:\n  Expected: {} records\n  Actual: {} records\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Record mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that the file at `path` reads back as `expected`, using detected drivers.
///
/// # Panics
///
/// Panics if the file cannot be read or its records differ.
pub fn assert_file_records<P: AsRef<Path>>(path: P, expected: &[Record]) {
    let path = path.as_ref();
    let actual = crate::read_all(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    assert_records_equal(&actual, expected);
}
