//! Single-pass operations that work directly on a file.
//!
//! Each call scans the file from the top on its own; nothing is cached and
//! no [`Document`](crate::Document) is involved. A document loaded earlier
//! does not see changes made by [`write_value`].
//!
//! The free functions use the local filesystem. [`FileOps`] runs the same
//! operations against any [`FileStore`] and a [`FileOpsConfig`].
//!
//! These scans do not de-duplicate: [`read_all_sections`] lists a repeated
//! header every time it appears, and [`read_value`] matches a key under any
//! occurrence of the section. [`read_all_keys`] stops at the first header
//! following the requested section, so only the first body is listed.
//!
//! # Examples
//!
//! ```
//! use inifile::ops::FileOps;
//! use inifile::store::MemoryFileStore;
//!
//! let store = MemoryFileStore::new();
//! store.insert("app.ini", "[server]\nport = 8080 ; default\n");
//! let ops = FileOps::new(store.clone());
//!
//! assert!(ops.write_value("app.ini", "server", "port", "9090").unwrap());
//! assert_eq!(
//!     store.contents("app.ini").as_deref(),
//!     Some("[server]\nport = 9090 ; default\n")
//! );
//! assert_eq!(
//!     ops.read_value("app.ini", "server", "port", None).unwrap().as_deref(),
//!     Some("9090")
//! );
//! ```

use std::io::Write;
use std::path::Path;

use crate::config::FileOpsConfig;
use crate::error::{Error, Result};
use crate::parser::{classify, normalize_section_name, value_span, Line};
use crate::store::{FileStore, LineIter, SystemFileStore};

/// Runs file-scoped operations through a store.
#[derive(Debug, Clone)]
pub struct FileOps<S: FileStore = SystemFileStore> {
    store: S,
    config: FileOpsConfig,
}

impl Default for FileOps<SystemFileStore> {
    fn default() -> Self {
        Self::new(SystemFileStore)
    }
}

impl<S: FileStore> FileOps<S> {
    /// Create operations over `store` with the default configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, FileOpsConfig::default())
    }

    /// Create operations over `store` with an explicit configuration.
    #[must_use]
    pub fn with_config(store: S, config: FileOpsConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FileOpsConfig {
        &self.config
    }

    fn open(&self, path: &Path) -> Result<LineIter> {
        self.store
            .open_lossy(path)
            .map_err(|e| Error::file_handling(path, e))
    }

    /// Read one value, stopping at the first match.
    ///
    /// Returns `default` when the section or key is not present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the section or key is empty
    /// after normalization, and [`Error::FileHandling`] if the file cannot be
    /// read.
    pub fn read_value(
        &self,
        path: impl AsRef<Path>,
        section: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<String>> {
        let path = path.as_ref();
        let (section, key) = validate_target(section, key)?;

        let mut in_target = false;
        for line in self.open(path)? {
            let line = line.map_err(|e| Error::file_handling(path, e))?;
            match classify(&line) {
                Line::Section(name) => in_target = name == section,
                Line::KeyValue { key: found, value } if in_target && found == key => {
                    return Ok(Some(value.to_string()));
                }
                _ => {}
            }
        }

        Ok(default.map(str::to_string))
    }

    /// Rewrite the value of the first matching key.
    ///
    /// The file is streamed into a new temporary copy named after it (see
    /// [`FileOpsConfig::temp_path`]); an existing file is never reused for
    /// it. Every line is copied verbatim except
    /// the first line that assigns `key` inside `section`; in that line only
    /// the value text is replaced, so indentation, spacing around `=`, the
    /// inline comment and the line terminator survive. Lines after the match
    /// are copied without inspection.
    ///
    /// When a line was replaced the copy overwrites the original and `true`
    /// is returned. Otherwise the copy is deleted, the original is left
    /// byte-for-byte untouched and `false` is returned.
    ///
    /// The value must read back unchanged, so it may not contain a line
    /// break or `;`, nor start or end with whitespace. The file must be valid
    /// UTF-8; unlike the lookups, the rewrite does not decode lossily.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the section or key is empty
    /// after normalization or `value` cannot be stored as written, and
    /// [`Error::FileHandling`] if any store call fails or the file is not
    /// valid UTF-8.
    pub fn write_value(
        &self,
        path: impl AsRef<Path>,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        let path = path.as_ref();
        let (section, key) = validate_target(section, key)?;
        validate_value(value)?;

        let lines = self
            .store
            .open_for_read(path)
            .map_err(|e| Error::file_handling(path, e))?;
        let preferred = self.config.temp_path(path);
        let (temp, writer) = self
            .store
            .create_temp(&preferred)
            .map_err(|e| Error::file_handling(&preferred, e))?;

        let updated = match copy_replacing(lines, writer, section, key, value) {
            Ok(updated) => updated,
            Err(CopyError::Read(e)) => {
                self.discard(&temp);
                return Err(Error::file_handling(path, e));
            }
            Err(CopyError::Write(e)) => {
                self.discard(&temp);
                return Err(Error::file_handling(&temp, e));
            }
        };

        if !updated {
            log::debug!("No [{section}] {key} in {}; leaving it unchanged", path.display());
            self.store
                .delete(&temp)
                .map_err(|e| Error::file_handling(&temp, e))?;
            return Ok(false);
        }

        if let Err(e) = self.store.copy(&temp, path, true) {
            self.discard(&temp);
            return Err(Error::file_handling(path, e));
        }
        self.discard(&temp);

        log::debug!("Updated [{section}] {key} in {}", path.display());
        Ok(true)
    }

    /// Best-effort removal of a staging file.
    fn discard(&self, temp: &Path) {
        if let Err(e) = self.store.delete(temp) {
            log::warn!("Failed to remove temporary file {}: {e}", temp.display());
        }
    }

    /// List every section header in file order, repeats included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the file cannot be read.
    pub fn read_all_sections(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let mut sections = Vec::new();

        for line in self.open(path)? {
            let line = line.map_err(|e| Error::file_handling(path, e))?;
            if let Line::Section(name) = classify(&line) {
                sections.push(name.to_string());
            }
        }

        Ok(sections)
    }

    /// List the keys of the first occurrence of `section`, in file order.
    ///
    /// Keys are taken as written left of the `=`, trimmed; repeated keys are
    /// listed each time. Returns an empty list if the section is not found
    /// or its name normalizes to empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the file cannot be read.
    pub fn read_all_keys(&self, path: impl AsRef<Path>, section: &str) -> Result<Vec<String>> {
        let path = path.as_ref();
        let section = normalize_section_name(section);
        let mut keys = Vec::new();
        if section.is_empty() {
            return Ok(keys);
        }

        let mut in_target = false;
        for line in self.open(path)? {
            let line = line.map_err(|e| Error::file_handling(path, e))?;
            match classify(&line) {
                Line::Section(_) if in_target => break,
                Line::Section(name) => in_target = name == section,
                Line::KeyValue { key, .. } if in_target => keys.push(key.to_string()),
                _ => {}
            }
        }

        Ok(keys)
    }
}

/// Normalize and check the section/key pair addressed by a read or write.
fn validate_target<'a>(section: &'a str, key: &'a str) -> Result<(&'a str, &'a str)> {
    let section = normalize_section_name(section);
    if section.is_empty() {
        return Err(Error::InvalidArgument {
            field: "section".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidArgument {
            field: "key".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    Ok((section, key))
}

/// Check that `value` reads back exactly as written once stored.
fn validate_value(value: &str) -> Result<()> {
    let reason = if value.contains(['\n', '\r']) {
        "must not contain line breaks"
    } else if value.contains(';') {
        "must not contain ';', which starts a comment"
    } else if value.trim() != value {
        "must not start or end with whitespace"
    } else {
        return Ok(());
    };

    Err(Error::InvalidArgument {
        field: "value".to_string(),
        reason: reason.to_string(),
    })
}

enum CopyError {
    Read(std::io::Error),
    Write(std::io::Error),
}

/// Stream `lines` into `writer`, replacing the first matching value.
fn copy_replacing(
    lines: LineIter,
    mut writer: Box<dyn Write>,
    section: &str,
    key: &str,
    value: &str,
) -> std::result::Result<bool, CopyError> {
    let mut in_target = false;
    let mut updated = false;

    for line in lines {
        let mut line = line.map_err(CopyError::Read)?;

        if !updated {
            let is_match = match classify(&line) {
                Line::Section(name) => {
                    in_target = name == section;
                    false
                }
                Line::KeyValue { key: found, .. } => in_target && found == key,
                _ => false,
            };

            if is_match {
                if let Some(span) = value_span(&line) {
                    line.replace_range(span, value);
                    updated = true;
                }
            }
        }

        writer
            .write_all(line.as_bytes())
            .map_err(CopyError::Write)?;
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(updated)
}

/// Read one value from a file on disk.
///
/// See [`FileOps::read_value`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an empty section or key and
/// [`Error::FileHandling`] if the file cannot be read.
pub fn read_value(
    path: impl AsRef<Path>,
    section: &str,
    key: &str,
    default: Option<&str>,
) -> Result<Option<String>> {
    FileOps::<SystemFileStore>::default().read_value(path, section, key, default)
}

/// Rewrite one value in a file on disk, staging the copy in the working
/// directory.
///
/// See [`FileOps::write_value`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for an empty section or key and
/// [`Error::FileHandling`] if any file operation fails.
pub fn write_value(path: impl AsRef<Path>, section: &str, key: &str, value: &str) -> Result<bool> {
    FileOps::<SystemFileStore>::default().write_value(path, section, key, value)
}

/// List every section header of a file on disk, repeats included.
///
/// # Errors
///
/// Returns [`Error::FileHandling`] if the file cannot be read.
pub fn read_all_sections(path: impl AsRef<Path>) -> Result<Vec<String>> {
    FileOps::<SystemFileStore>::default().read_all_sections(path)
}

/// List the keys of the first occurrence of a section in a file on disk.
///
/// # Errors
///
/// Returns [`Error::FileHandling`] if the file cannot be read.
pub fn read_all_keys(path: impl AsRef<Path>, section: &str) -> Result<Vec<String>> {
    FileOps::<SystemFileStore>::default().read_all_keys(path, section)
}
