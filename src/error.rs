use crate::driver::Family;
use crate::mode::Mode;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed codec error carried by [`Error::Decode`] and [`Error::Encode`].
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the registry, the dispatcher, and the drivers.
///
/// Every variant names the identifier that could not be resolved (driver name,
/// extension, mode, option) so a command-line layer can print it as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// No driver with this name is registered in the family.
    #[error("unrecognized {family} driver: {name}")]
    UnknownDriver { family: Family, name: String },

    /// No format driver claims the extension taken from a path.
    #[error("could not detect a format driver for extension '{token}'")]
    UndetectableFormat { token: String },

    /// The driver does not support the requested mode.
    #[error("mode '{mode}' is unsupported for driver {driver}: {}", join_modes(.supported))]
    UnsupportedMode {
        driver: String,
        mode: Mode,
        supported: Vec<Mode>,
    },

    /// A mode string that is not one of `r`, `w` or `a`.
    #[error("invalid mode '{mode}': expected one of r, w, a")]
    InvalidMode { mode: String },

    /// Registration of a second driver with an existing name.
    #[error("a {family} driver named '{name}' is already registered")]
    DuplicateName { family: Family, name: String },

    /// Registration of a driver claiming an extension another driver owns.
    #[error("extension '{extension}' is already claimed by {family} driver '{owner}'")]
    DuplicateExtension {
        family: Family,
        extension: String,
        owner: String,
    },

    /// A driver whose metadata violates the registry invariants.
    #[error("invalid {family} driver '{name}': {reason}")]
    InvalidDescriptor {
        family: Family,
        name: String,
        reason: String,
    },

    /// An unknown or ill-typed driver option.
    #[error("invalid option '{option}' for driver {driver}: {reason}")]
    InvalidOption {
        driver: String,
        option: String,
        reason: String,
    },

    /// A malformed command-line argument.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// The codec rejected the unit at `position`.
    #[error("{driver} failed to decode record at position {position}: {source}")]
    Decode {
        driver: String,
        position: u64,
        source: CodecError,
    },

    /// The codec could not encode a record.
    #[error("{driver} failed to encode record at position {position}: {source}")]
    Encode {
        driver: String,
        position: u64,
        source: CodecError,
    },

    /// Read or write on a closed instance.
    #[error("I/O operation on closed {driver} stream")]
    ClosedStream { driver: String },

    /// Write on a read instance, or read on a write instance.
    #[error("{operation} is not supported by {driver} opened in mode '{mode}'")]
    UnsupportedOperation {
        driver: String,
        operation: &'static str,
        mode: Mode,
    },

    /// The raw resource behind a path could not be opened.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Underlying I/O errors from the byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn unknown_driver(family: Family, name: impl Into<String>) -> Self {
        Self::UnknownDriver {
            family,
            name: name.into(),
        }
    }

    pub fn unsupported_mode(driver: impl Into<String>, mode: Mode, supported: &[Mode]) -> Self {
        Self::UnsupportedMode {
            driver: driver.into(),
            mode,
            supported: supported.to_vec(),
        }
    }

    pub fn invalid_option(
        driver: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            driver: driver.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(
        driver: impl Into<String>,
        position: u64,
        source: impl Into<CodecError>,
    ) -> Self {
        Self::Decode {
            driver: driver.into(),
            position,
            source: source.into(),
        }
    }

    pub fn encode(
        driver: impl Into<String>,
        position: u64,
        source: impl Into<CodecError>,
    ) -> Self {
        Self::Encode {
            driver: driver.into(),
            position,
            source: source.into(),
        }
    }

    pub fn closed(driver: impl Into<String>) -> Self {
        Self::ClosedStream {
            driver: driver.into(),
        }
    }

    pub fn unsupported_operation(
        driver: impl Into<String>,
        operation: &'static str,
        mode: Mode,
    ) -> Self {
        Self::UnsupportedOperation {
            driver: driver.into(),
            operation,
            mode,
        }
    }
}

fn join_modes(modes: &[Mode]) -> String {
    modes
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;
