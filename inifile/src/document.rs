//! In-memory INI document.
//!
//! A [`Document`] is built by scanning a file once and then answers any
//! number of queries without touching the file again. Building follows a
//! first-wins policy:
//!
//! - a section that appears twice keeps only its first body; everything under
//!   the later header is dropped, not merged
//! - a key that appears twice in one section keeps its first value
//! - keys before the first header, and keys that are empty after trimming,
//!   are dropped
//!
//! None of these are errors. The only failure a query can report is
//! [`Error::NotLoaded`], raised when the document was created with
//! [`Document::new`] and never loaded.
//!
//! # Examples
//!
//! ```
//! use inifile::Document;
//!
//! let doc = Document::from_lines("inline", ["[A]", "k=1", "[A]", "k=2"]);
//! assert_eq!(doc.get_value("A", "k").unwrap(), Some("1"));
//! assert_eq!(doc.get_value("[A]", "missing").unwrap(), None);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::parser::{classify, normalize_section_name, Line};
use crate::section::Section;
use crate::store::{FileStore, SystemFileStore};

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

/// A parsed INI file.
///
/// The document is identified by a name (the source path unless built from
/// raw lines) and the modification time captured at load, which lets
/// [`equivalent`](Document::equivalent) skip the content comparison for two
/// loads of an unchanged file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    name: String,
    modified: Option<SystemTime>,
    sections: Option<HashMap<String, Section>>,
}

impl Document {
    /// Creates an unloaded document.
    ///
    /// Every query on it fails with [`Error::NotLoaded`] until one of the
    /// `load_file` methods is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a document from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the file cannot be read or its
    /// metadata is unavailable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(&SystemFileStore, path)
    }

    /// Loads a document through the given store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the store fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use inifile::Document;
    /// use inifile::store::MemoryFileStore;
    ///
    /// let store = MemoryFileStore::new();
    /// store.insert("app.ini", "[server]\nport = 8080 ; default\n");
    ///
    /// let doc = Document::load_with(&store, "app.ini").unwrap();
    /// assert_eq!(doc.name(), "app.ini");
    /// assert_eq!(doc.get_value("server", "port").unwrap(), Some("8080"));
    /// ```
    pub fn load_with<S>(store: &S, path: impl AsRef<Path>) -> Result<Self>
    where
        S: FileStore + ?Sized,
    {
        let mut doc = Self::new();
        doc.load_file_with(store, path)?;
        Ok(doc)
    }

    /// Builds a document from lines already in memory.
    ///
    /// No modification time is captured.
    pub fn from_lines<I, L>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        Self {
            name: name.into(),
            modified: None,
            sections: Some(build_sections(lines)),
        }
    }

    /// (Re)loads this document from the filesystem, replacing its name,
    /// timestamp and sections.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the file cannot be read. The
    /// document is left unchanged in that case.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_file_with(&SystemFileStore, path)
    }

    /// (Re)loads this document through the given store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileHandling`] if the store fails. The document is
    /// left unchanged in that case.
    pub fn load_file_with<S>(&mut self, store: &S, path: impl AsRef<Path>) -> Result<()>
    where
        S: FileStore + ?Sized,
    {
        let path = path.as_ref();
        let lines = store
            .read_all_lines(path)
            .map_err(|e| Error::file_handling(path, e))?;
        let modified = store
            .modified_time(path)
            .map_err(|e| Error::file_handling(path, e))?;

        let sections = build_sections(&lines);
        log::debug!(
            "Loaded {} section(s) from {} ({} line(s))",
            sections.len(),
            path.display(),
            lines.len()
        );

        self.name = path.display().to_string();
        self.modified = Some(modified);
        self.sections = Some(sections);
        Ok(())
    }

    /// The document name; the source path unless built from lines.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The modification time captured when the file was loaded.
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Whether the document holds parsed content (possibly zero sections).
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.sections.is_some()
    }

    fn loaded(&self) -> Result<&HashMap<String, Section>> {
        self.sections.as_ref().ok_or(Error::NotLoaded)
    }

    /// Names of all sections. Order is unspecified.
    ///
    /// Duplicate headers in the source appear once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn sections(&self) -> Result<Vec<&str>> {
        Ok(self.loaded()?.keys().map(String::as_str).collect())
    }

    /// Looks up a section by caller-supplied name.
    ///
    /// The name is normalized first, so `"[main]"` and `" main "` both find
    /// section `main`. A name that normalizes to empty finds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn section(&self, name: &str) -> Result<Option<&Section>> {
        let sections = self.loaded()?;
        let name = normalize_section_name(name);
        if name.is_empty() {
            return Ok(None);
        }
        Ok(sections.get(name))
    }

    /// Checks whether a section exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn has_section(&self, name: &str) -> Result<bool> {
        Ok(self.section(name)?.is_some())
    }

    /// Checks whether `key` exists in `section`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn has_key(&self, section: &str, key: &str) -> Result<bool> {
        Ok(self
            .section(section)?
            .is_some_and(|section| section.contains_key(key)))
    }

    /// Returns the value of `key` in `section`.
    ///
    /// A missing section or key is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn get_value(&self, section: &str, key: &str) -> Result<Option<&str>> {
        Ok(self.section(section)?.and_then(|section| section.get(key)))
    }

    /// Returns the value of `key` in `section`, or `fallback`.
    ///
    /// Unlike [`get_value`](Self::get_value) this never fails: an unloaded
    /// document also yields `fallback`.
    ///
    /// # Examples
    ///
    /// ```
    /// use inifile::Document;
    ///
    /// let unloaded = Document::new();
    /// assert_eq!(unloaded.get_value_or_default("a", "b", "none"), "none");
    /// ```
    #[must_use]
    pub fn get_value_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        fallback: &'a str,
    ) -> &'a str {
        match self.get_value(section, key) {
            Ok(Some(value)) => value,
            Ok(None) | Err(_) => fallback,
        }
    }

    /// All keys of `section`; empty if the section does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn get_all_keys(&self, section: &str) -> Result<Vec<&str>> {
        Ok(self.section(section)?.map(Section::keys).unwrap_or_default())
    }

    /// All key/value pairs of `section`; empty if the section does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the document was never loaded.
    pub fn get_all_pairs(&self, section: &str) -> Result<Vec<(&str, &str)>> {
        Ok(self
            .section(section)?
            .map(Section::pairs)
            .unwrap_or_default())
    }

    /// Compares two documents.
    ///
    /// Documents with the same name and the same captured modification time
    /// are equal without looking at their content. Two unloaded documents are
    /// equal. Otherwise the section maps are compared structurally: same
    /// section names, and for each section the same key/value pairs, in any
    /// order. Name and timestamp play no part in that comparison.
    ///
    /// # Examples
    ///
    /// ```
    /// use inifile::Document;
    ///
    /// let a = Document::from_lines("a.ini", ["[s]", "x=1", "y=2"]);
    /// let b = Document::from_lines("b.ini", ["[s]", "y=2", "x=1"]);
    /// let c = Document::from_lines("c.ini", ["[s]", "x=1", "y=3"]);
    ///
    /// assert!(a.equivalent(&b));
    /// assert!(!a.equivalent(&c));
    /// ```
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        if self.name == other.name && self.modified.is_some() && self.modified == other.modified
        {
            return true;
        }

        match (&self.sections, &other.sections) {
            (None, None) => true,
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Builds the section map in a single pass over `lines`.
///
/// `current` holds the section being filled. `None` means keys are being
/// skipped: either no header has been seen yet or the last header repeated
/// a section that was already committed.
fn build_sections<I, L>(lines: I) -> HashMap<String, Section>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut sections = HashMap::new();
    let mut current: Option<(String, Section)> = None;

    for raw in lines {
        match classify(raw.as_ref()) {
            Line::Section(name) => {
                if let Some((done, section)) = current.take() {
                    sections.insert(done, section);
                }

                if sections.contains_key(name) {
                    log::debug!("Skipping repeated section [{name}]");
                } else {
                    current = Some((name.to_string(), Section::new()));
                }
            }
            Line::KeyValue { key, value } => {
                let Some((name, section)) = current.as_mut() else {
                    log::debug!("Skipping key '{key}' outside an active section");
                    continue;
                };
                if key.is_empty() {
                    continue;
                }
                if !section.insert_first(key, value) {
                    log::debug!("Skipping repeated key '{key}' in [{name}]");
                }
            }
            Line::Blank | Line::Comment | Line::Unrecognized => {}
        }
    }

    if let Some((name, section)) = current {
        sections.insert(name, section);
    }

    sections
}
