//! I/O modes a driver can be opened with.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a driver instance uses its stream. Fixed for the instance's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "r")]
    Read,
    #[serde(rename = "w")]
    Write,
    #[serde(rename = "a")]
    Append,
}

impl Mode {
    /// Every mode, in `r`, `w`, `a` order.
    pub const ALL: [Mode; 3] = [Mode::Read, Mode::Write, Mode::Append];

    /// Read-only drivers declare this set.
    pub const READ_ONLY: [Mode; 1] = [Mode::Read];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Read => "r",
            Mode::Write => "w",
            Mode::Append => "a",
        }
    }

    /// `true` for [`Mode::Read`].
    #[must_use]
    pub fn is_read(self) -> bool {
        self == Mode::Read
    }

    /// `true` for [`Mode::Write`] and [`Mode::Append`].
    #[must_use]
    pub fn is_write(self) -> bool {
        !self.is_read()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "read" => Ok(Mode::Read),
            "w" | "write" => Ok(Mode::Write),
            "a" | "append" => Ok(Mode::Append),
            _ => Err(Error::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}
