#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # inifile
//!
//! A library for parsing, querying and rewriting INI configuration files.
//!
//! Files are made of `[section]` headers followed by `key = value` lines.
//! Lines starting with `;` are comments, and a `;` inside a value starts a
//! trailing comment. Every value is a plain string.
//!
//! There are two ways to work with a file:
//!
//! - Load it once into a [`Document`] and query it in memory. Repeated
//!   sections and keys are resolved first-wins while loading.
//! - Call the single-pass functions in [`ops`] ([`read_value`],
//!   [`write_value`], [`read_all_sections`], [`read_all_keys`]), which scan
//!   the file on every call. [`write_value`] rewrites one value in place and
//!   leaves every other byte of the file as it was.
//!
//! ## Core Types
//!
//! - [`Document`] and [`Section`]: the in-memory model
//! - [`FileOps`] and [`FileOpsConfig`]: file-scoped operations over a store
//! - [`FileStore`]: the I/O seam, with [`SystemFileStore`] and
//!   [`MemoryFileStore`] implementations
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use inifile::Document;
//!
//! let doc = Document::from_lines(
//!     "settings",
//!     ["; app settings", "[server]", "host = example.org ; public", "port=8080"],
//! );
//!
//! assert!(doc.has_section("[server]").unwrap());
//! assert_eq!(doc.get_value("server", "host").unwrap(), Some("example.org"));
//! assert_eq!(doc.get_value_or_default("server", "tls", "off"), "off");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod ops;
pub mod parser;
pub mod section;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::{FileOpsConfig, FileOpsConfigBuilder};
pub use document::Document;
pub use error::{Error, Result};
pub use ops::{read_all_keys, read_all_sections, read_value, write_value, FileOps};
pub use section::Section;
pub use store::{FileStore, MemoryFileStore, SystemFileStore};
