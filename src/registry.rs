//! The driver registry: name and extension tables for both driver families.
//!
//! A [`Registry`] holds, per [`Family`], a table from name to driver and a
//! table from extension to driver. Registration validates the driver and
//! refuses collisions; nothing is ever silently overwritten.
//!
//! The process-wide registry behind the free functions of this module is
//! created on first use with the built-in drivers enabled at build time. Each
//! built-in driver module contributes one explicit `register` call. Later
//! registrations are serialized through a lock, and lookups see either the
//! whole driver or nothing.
//!
//! # Examples
//! ```
//! use recordio::driver::Family;
//! use recordio::registry;
//!
//! # fn main() -> recordio::Result<()> {
//! let json = registry::lookup_by_extension(Family::Format, "json")?;
//! assert_eq!(json.name(), "newlinejson");
//! assert!(registry::names(Family::Compression)?.contains(&"gzip".to_string()));
//! # Ok(())
//! # }
//! ```

use crate::driver::{CompressionDriver, Driver, Family, FormatDriver};
use crate::error::{Error, Result};
use crate::mode::Mode;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Global driver registry, initialized with the built-in drivers on first use.
static REGISTRY: RwLock<Option<Registry>> = RwLock::new(None);

/// Metadata the tables need from a driver of either family.
trait Describe {
    fn describe_name(&self) -> &str;
    fn describe_extensions(&self) -> &[&str];
    fn describe_modes(&self) -> &[Mode];
}

impl Describe for dyn FormatDriver {
    fn describe_name(&self) -> &str {
        self.name()
    }
    fn describe_extensions(&self) -> &[&str] {
        self.extensions()
    }
    fn describe_modes(&self) -> &[Mode] {
        self.modes()
    }
}

impl Describe for dyn CompressionDriver {
    fn describe_name(&self) -> &str {
        self.name()
    }
    fn describe_extensions(&self) -> &[&str] {
        self.extensions()
    }
    fn describe_modes(&self) -> &[Mode] {
        self.modes()
    }
}

struct Table<D: ?Sized> {
    family: Family,
    by_name: BTreeMap<String, Arc<D>>,
    by_extension: HashMap<String, Arc<D>>,
}

impl<D: ?Sized> Clone for Table<D> {
    fn clone(&self) -> Self {
        Self {
            family: self.family,
            by_name: self.by_name.clone(),
            by_extension: self.by_extension.clone(),
        }
    }
}

impl<D: ?Sized + Describe> Table<D> {
    fn new(family: Family) -> Self {
        Self {
            family,
            by_name: BTreeMap::new(),
            by_extension: HashMap::new(),
        }
    }

    fn invalid(&self, name: &str, reason: impl Into<String>) -> Error {
        Error::InvalidDescriptor {
            family: self.family,
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Validate and insert `driver`; on error the table is unchanged.
    fn insert(&mut self, driver: Arc<D>) -> Result<()> {
        let name = driver.describe_name();
        if name.trim().is_empty() {
            return Err(self.invalid(name, "name is empty"));
        }
        if driver.describe_modes().is_empty() {
            return Err(self.invalid(name, "no supported modes"));
        }
        let extensions = driver.describe_extensions();
        if extensions.is_empty() {
            return Err(self.invalid(name, "no extensions"));
        }
        for ext in extensions {
            if ext.is_empty() || ext.starts_with('.') || ext.contains('.') {
                return Err(self.invalid(
                    name,
                    format!("extension '{ext}' must be a single token without dots"),
                ));
            }
            if *ext != ext.to_lowercase() {
                return Err(self.invalid(name, format!("extension '{ext}' is not lowercase")));
            }
        }
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateName {
                family: self.family,
                name: name.to_string(),
            });
        }
        for ext in extensions {
            if let Some(owner) = self.by_extension.get(*ext) {
                return Err(Error::DuplicateExtension {
                    family: self.family,
                    extension: (*ext).to_string(),
                    owner: owner.describe_name().to_string(),
                });
            }
        }

        let key = name.to_string();
        for ext in extensions {
            self.by_extension.insert((*ext).to_string(), Arc::clone(&driver));
        }
        self.by_name.insert(key, driver);
        Ok(())
    }

    fn by_name(&self, name: &str) -> Result<Arc<D>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_driver(self.family, name))
    }

    fn by_extension(&self, ext: &str) -> Option<Arc<D>> {
        self.by_extension
            .get(&normalize_extension(ext))
            .cloned()
    }

    fn names(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }
}

/// Lowercase and strip leading dots, so `".GZ"` and `"gz"` match the same driver.
pub(crate) fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Name and extension tables for format and compression drivers.
///
/// Cloning is cheap: drivers are shared behind `Arc`.
#[derive(Clone)]
pub struct Registry {
    formats: Table<dyn FormatDriver>,
    compressions: Table<dyn CompressionDriver>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: Table::new(Family::Format),
            compressions: Table::new(Family::Compression),
        }
    }

    /// A registry holding every built-in driver enabled at build time.
    ///
    /// # Errors
    /// Only if two built-in drivers collide, which is a bug in this crate.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        #[cfg(feature = "format-jsonl")]
        crate::io::jsonl::register(&mut registry)?;
        #[cfg(feature = "format-msgpack")]
        crate::io::msgpack::register(&mut registry)?;
        #[cfg(any(
            feature = "compression-gzip",
            feature = "compression-zstd",
            feature = "compression-bzip2",
            feature = "compression-xz"
        ))]
        crate::io::compression::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Register a driver in its family's tables.
    ///
    /// # Errors
    /// - [`Error::InvalidDescriptor`] for an empty name, empty extension or
    ///   mode set, or a malformed extension
    /// - [`Error::DuplicateName`] if the family already has a driver with this name
    /// - [`Error::DuplicateExtension`] if another driver in the family claims one
    ///   of its extensions
    pub fn register(&mut self, driver: Driver) -> Result<()> {
        match driver {
            Driver::Format(d) => self.formats.insert(d),
            Driver::Compression(d) => self.compressions.insert(d),
        }
    }

    pub fn register_format(&mut self, driver: Arc<dyn FormatDriver>) -> Result<()> {
        self.formats.insert(driver)
    }

    pub fn register_compression(&mut self, driver: Arc<dyn CompressionDriver>) -> Result<()> {
        self.compressions.insert(driver)
    }

    /// Look up a driver by its exact name.
    pub fn lookup_by_name(&self, family: Family, name: &str) -> Result<Driver> {
        match family {
            Family::Format => self.format(name).map(Driver::Format),
            Family::Compression => self.compression(name).map(Driver::Compression),
        }
    }

    /// Look up a driver by extension, case-insensitively.
    pub fn lookup_by_extension(&self, family: Family, ext: &str) -> Result<Driver> {
        match family {
            Family::Format => self.format_for_extension(ext).map(Driver::Format),
            Family::Compression => self.compression_for_extension(ext).map(Driver::Compression),
        }
    }

    pub fn format(&self, name: &str) -> Result<Arc<dyn FormatDriver>> {
        self.formats.by_name(name)
    }

    pub fn compression(&self, name: &str) -> Result<Arc<dyn CompressionDriver>> {
        self.compressions.by_name(name)
    }

    pub fn format_for_extension(&self, ext: &str) -> Result<Arc<dyn FormatDriver>> {
        self.formats
            .by_extension(ext)
            .ok_or_else(|| Error::unknown_driver(Family::Format, normalize_extension(ext)))
    }

    pub fn compression_for_extension(&self, ext: &str) -> Result<Arc<dyn CompressionDriver>> {
        self.compressions
            .by_extension(ext)
            .ok_or_else(|| Error::unknown_driver(Family::Compression, normalize_extension(ext)))
    }

    /// `true` if some compression driver claims `ext`.
    #[must_use]
    pub fn is_compression_extension(&self, ext: &str) -> bool {
        self.compressions.by_extension(ext).is_some()
    }

    /// Registered driver names of a family, sorted.
    #[must_use]
    pub fn names(&self, family: Family) -> Vec<String> {
        match family {
            Family::Format => self.formats.names(),
            Family::Compression => self.compressions.names(),
        }
    }
}

/// Run `f` against the global registry, initializing it on first use.
///
/// The read lock is held while `f` runs, so `f` must not register drivers.
pub(crate) fn with_registry<T>(f: impl FnOnce(&Registry) -> Result<T>) -> Result<T> {
    {
        let lock = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(registry) = lock.as_ref() {
            return f(registry);
        }
    }
    let mut lock = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let registry = match lock.take() {
        Some(registry) => registry,
        None => Registry::with_builtins()?,
    };
    f(lock.insert(registry))
}

fn with_registry_mut<T>(f: impl FnOnce(&mut Registry) -> Result<T>) -> Result<T> {
    let mut lock = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let registry = match lock.take() {
        Some(registry) => registry,
        None => Registry::with_builtins()?,
    };
    f(lock.insert(registry))
}

/// A point-in-time copy of the global registry.
pub fn snapshot() -> Result<Registry> {
    with_registry(|r| Ok(r.clone()))
}

/// Register a driver globally.
///
/// # Examples
/// ```
/// use recordio::driver::CompressionDriver;
/// use recordio::io::stream::ByteStream;
/// use recordio::{registry, DriverOptions, Mode, Result};
/// use std::sync::Arc;
///
/// struct Identity;
/// impl CompressionDriver for Identity {
///     fn name(&self) -> &str { "identity" }
///     fn extensions(&self) -> &[&str] { &["ident"] }
///     fn open(&self, s: Box<dyn ByteStream>, _: Mode, _: &DriverOptions) -> Result<Box<dyn ByteStream>> {
///         Ok(s)
///     }
/// }
///
/// registry::register_compression(Arc::new(Identity)).unwrap();
/// assert!(registry::register_compression(Arc::new(Identity)).is_err());
/// ```
pub fn register(driver: Driver) -> Result<()> {
    with_registry_mut(|r| r.register(driver))
}

pub fn register_format(driver: Arc<dyn FormatDriver>) -> Result<()> {
    with_registry_mut(|r| r.register_format(driver))
}

pub fn register_compression(driver: Arc<dyn CompressionDriver>) -> Result<()> {
    with_registry_mut(|r| r.register_compression(driver))
}

pub fn lookup_by_name(family: Family, name: &str) -> Result<Driver> {
    with_registry(|r| r.lookup_by_name(family, name))
}

pub fn lookup_by_extension(family: Family, ext: &str) -> Result<Driver> {
    with_registry(|r| r.lookup_by_extension(family, ext))
}

/// Registered driver names of a family, sorted. Feeds CLI choice lists.
pub fn names(family: Family) -> Result<Vec<String>> {
    with_registry(|r| Ok(r.names(family)))
}
