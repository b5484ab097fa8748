//! Line classification for INI text.
//!
//! Every operation in the crate sees a file one line at a time and asks the
//! same question: what kind of line is this? The functions here answer it
//! without keeping any state, so the document builder and the single-pass
//! file operations agree on exactly the same grammar:
//!
//! - blank lines and lines starting with `;` carry no data
//! - `[name]` opens a section; a missing `]` takes the rest of the line
//! - `key = value ; comment` splits on the first `=` and drops everything
//!   from the first `;` of the value onwards
//! - anything else is unrecognized and skipped
//!
//! A UTF-8 byte order mark in front of a line is ignored, so a file saved
//! with one still starts with its first header.
//!
//! A `;` inside a quoted value still starts a comment. Quoting is not part of
//! the supported dialect.

use std::ops::Range;

/// The UTF-8 byte order mark as it appears at the start of decoded text.
pub const BOM: char = '\u{FEFF}';

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

/// The classification of a single line.
///
/// Borrowed slices point into the line that was classified.
///
/// # Examples
///
/// ```
/// use inifile::parser::{classify, Line};
///
/// assert_eq!(classify("  "), Line::Blank);
/// assert_eq!(classify("; note"), Line::Comment);
/// assert_eq!(classify("[server]"), Line::Section("server"));
/// assert_eq!(
///     classify("port = 8080 ; default"),
///     Line::KeyValue { key: "port", value: "8080" }
/// );
/// assert_eq!(classify("garbage"), Line::Unrecognized);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty after trimming.
    Blank,
    /// Starts with `;`.
    Comment,
    /// A section header, holding the trimmed name without brackets.
    Section(&'a str),
    /// A `key=value` line. The key is trimmed; the value is comment-stripped
    /// and trimmed. The key may be empty.
    KeyValue {
        /// Text left of the first `=`.
        key: &'a str,
        /// Text right of the first `=`, up to the first `;`.
        value: &'a str,
    },
    /// A non-empty line that is none of the above.
    Unrecognized,
}

/// Classify a raw line.
///
/// Leading and trailing whitespace, including any line terminator, is
/// ignored, as is a leading byte order mark.
#[must_use]
pub fn classify(raw: &str) -> Line<'_> {
    let line = raw.strip_prefix(BOM).unwrap_or(raw).trim();

    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with(';') {
        return Line::Comment;
    }
    if let Some(rest) = line.strip_prefix('[') {
        return Line::Section(section_header_name(rest));
    }

    match line.split_once('=') {
        Some((key, value)) => Line::KeyValue {
            key: key.trim(),
            value: strip_inline_comment(value),
        },
        None => Line::Unrecognized,
    }
}

/// Extract a header name from the text following the opening `[`.
fn section_header_name(rest: &str) -> &str {
    let name = match rest.find(']') {
        Some(end) => &rest[..end],
        None => rest,
    };
    name.trim()
}

/// Normalize a caller-supplied section name.
///
/// Trims whitespace, then strips one leading `[` and one trailing `]`, so
/// `"[main]"`, `" main "` and `"main"` all refer to the same section.
///
/// # Examples
///
/// ```
/// use inifile::parser::normalize_section_name;
///
/// assert_eq!(normalize_section_name(" [main] "), "main");
/// assert_eq!(normalize_section_name("main]"), "main");
/// assert_eq!(normalize_section_name("[]"), "");
/// ```
#[must_use]
pub fn normalize_section_name(name: &str) -> &str {
    let name = name.trim();
    let name = name.strip_prefix('[').unwrap_or(name);
    name.strip_suffix(']').unwrap_or(name)
}

/// Drop a trailing `;comment` from a value and trim the remainder.
///
/// # Examples
///
/// ```
/// use inifile::parser::strip_inline_comment;
///
/// assert_eq!(strip_inline_comment(" 5 ; note"), "5");
/// assert_eq!(strip_inline_comment("plain"), "plain");
/// ```
#[must_use]
pub fn strip_inline_comment(value: &str) -> &str {
    match value.find(';') {
        Some(end) => value[..end].trim(),
        None => value.trim(),
    }
}

/// Locate the parsed value of a key-value line inside the raw line.
///
/// The returned byte range covers exactly the text that [`classify`] reports
/// as the value, so splicing a replacement into it keeps the key, the
/// surrounding whitespace, the inline comment and the line terminator intact.
/// An empty value yields an empty range just after the `=` and any spaces
/// that follow it.
///
/// Returns `None` when the line has no `=`.
///
/// # Examples
///
/// ```
/// use inifile::parser::value_span;
///
/// let line = "  port = 8080 ; default\n";
/// let span = value_span(line).unwrap();
/// assert_eq!(&line[span], "8080");
/// ```
#[must_use]
pub fn value_span(raw: &str) -> Option<Range<usize>> {
    let eq = raw.find('=')?;
    let after = &raw[eq + 1..];
    let segment = match after.find(';') {
        Some(end) => &after[..end],
        None => after,
    };

    let value = segment.trim();
    if value.is_empty() {
        let lead = segment.len() - segment.trim_start_matches([' ', '\t']).len();
        let start = eq + 1 + lead;
        return Some(start..start);
    }

    let lead = segment.len() - segment.trim_start().len();
    let start = eq + 1 + lead;
    Some(start..start + value.len())
}
