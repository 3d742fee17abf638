//! Testing utilities for code built on recordio.
//!
//! This module provides:
//!
//! - **Fixtures**: sample records covering every JSON value kind
//! - **Mock I/O**: temporary files and directories, in-memory streams that
//!   track open handles so tests can check nothing leaks
//! - **Assertions**: compare record sequences and file contents with
//!   readable failure messages
//!
//! # Quick Start
//!
//! ```no_run
//! use recordio::testing::*;
//! use recordio::{read_all, write_all};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = TempDirPath::new()?;
//! let path = dir.file_path("sample.msgpack.gz");
//! write_all(&path, &sample_records())?;
//! assert_records_equal(&read_all(&path)?, &sample_records());
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
