//! Metrics collection and reporting for driver activity.
//!
//! A [`MetricsCollector`] attached through
//! [`OpenOptions::metrics`](crate::OpenOptions::metrics) counts what every
//! file opened with it does: opens, closes, records read and written, and
//! decode errors. Custom metrics can be registered alongside the built-in
//! counters, and the whole set can be printed or saved as JSON.
//!
//! # Example
//!
//! ```no_run
//! use recordio::metrics::{MetricsCollector, RECORDS_WRITTEN};
//! use recordio::{Mode, OpenOptions, Record};
//!
//! # fn main() -> anyhow::Result<()> {
//! let metrics = MetricsCollector::new();
//! let mut out = OpenOptions::new(Mode::Write)
//!     .metrics(metrics.clone())
//!     .open("positions.json.gz")?;
//! out.write_record(&Record::new())?;
//! out.close()?;
//!
//! assert_eq!(metrics.counter(RECORDS_WRITTEN), 1);
//! metrics.print();
//! metrics.save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Files opened through the dispatcher.
pub const FILES_OPENED: &str = "files_opened";
/// Files closed, explicitly or on drop.
pub const FILES_CLOSED: &str = "files_closed";
/// Records returned by reads.
pub const RECORDS_READ: &str = "records_read";
/// Records accepted by writes.
pub const RECORDS_WRITTEN: &str = "records_written";
/// Reads that failed with a decode error.
pub const DECODE_ERRORS: &str = "decode_errors";

/// Trait for custom metrics.
pub trait Metric: Send + Sync + Any {
    /// The name of this metric (e.g., `records_read`).
    fn name(&self) -> &str;

    /// The current value of this metric as a JSON value.
    fn value(&self) -> Value;

    /// Optional description of what this metric measures.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Cast to Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Thread-safe container for driver metrics.
///
/// Clones share the same underlying set, so one collector can be handed to
/// many files.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<HashMap<String, Box<dyn Metric>>>>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Box<dyn Metric>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a custom metric.
    ///
    /// If a metric with the same name already exists, it will be replaced.
    pub fn register(&self, metric: Box<dyn Metric>) {
        self.lock().insert(metric.name().to_string(), metric);
    }

    /// Increment a counter metric by name.
    ///
    /// If the metric doesn't exist, it will be created as a [`CounterMetric`].
    /// A non-counter metric with the same name is left untouched.
    pub fn increment_counter(&self, name: &str, value: u64) {
        let mut metrics = self.lock();
        let current = match metrics.get(name) {
            Some(metric) => match metric.as_any().downcast_ref::<CounterMetric>() {
                Some(counter) => counter.count,
                None => return,
            },
            None => 0,
        };
        metrics.insert(
            name.to_string(),
            Box::new(CounterMetric::with_value(name, current + value)),
        );
    }

    /// Set a counter metric to a specific value.
    pub fn set_counter(&self, name: &str, value: u64) {
        self.lock().insert(
            name.to_string(),
            Box::new(CounterMetric::with_value(name, value)),
        );
    }

    /// Current value of a counter, or 0 if it was never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.lock()
            .get(name)
            .and_then(|m| m.as_any().downcast_ref::<CounterMetric>())
            .map_or(0, |c| c.count)
    }

    /// Get all metrics as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let metrics = self.lock();
        let mut out = serde_json::Map::new();
        for (name, metric) in metrics.iter() {
            let mut entry = serde_json::Map::new();
            entry.insert("value".to_string(), metric.value());
            if let Some(desc) = metric.description() {
                entry.insert("description".to_string(), json!(desc));
            }
            out.insert(name.clone(), Value::Object(entry));
        }
        Value::Object(out)
    }

    /// Print all metrics to stdout in a human-readable format.
    pub fn print(&self) {
        println!("\n=========== Driver Metrics ===========");
        let metrics = self.lock();
        let mut sorted: Vec<_> = metrics.iter().collect();
        sorted.sort_by_key(|(name, _)| *name);
        for (name, metric) in sorted {
            if let Some(desc) = metric.description() {
                println!("{}: {} ({})", name, metric.value(), desc);
            } else {
                println!("{}: {}", name, metric.value());
            }
        }
        println!("======================================\n");
    }

    /// Save all metrics to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// Get a snapshot of all metric names and values.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.lock()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.value()))
            .collect()
    }
}

/// A simple counter metric.
pub struct CounterMetric {
    name: String,
    count: u64,
}

impl CounterMetric {
    /// Create a new counter metric with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, 0)
    }

    /// Create a counter metric with an initial value.
    pub fn with_value(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl Metric for CounterMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.count)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
