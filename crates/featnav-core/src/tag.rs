//! Tag lookup on a single line of text
//!
//! A tag is whatever the user's `tagPattern` matches; capture group 1 of the
//! match is the identifier used for the file search. Given the line under the
//! cursor and the cursor column, [`TagPattern::locate`] decides which tag (if
//! any) the user clicked.

use std::fmt;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::error::{Error, Result};

/// Identifier extracted from a tag's first capture group (e.g. a case number).
///
/// Never empty. Compared with exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a capture value, rejecting the empty string.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A compiled `tagPattern`.
///
/// Holds two compilations of the same source: a case-insensitive one for the
/// line under the cursor and a verbatim one for scanning file contents.
/// `Regex` carries no scan position, so a `TagPattern` can be shared freely;
/// every lookup starts its own `captures_iter`.
#[derive(Debug, Clone)]
pub struct TagPattern {
    source: String,
    line: Regex,
    content: Regex,
}

impl TagPattern {
    /// Compile a user-supplied pattern.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let invalid = |e: regex::Error| Error::InvalidPattern {
            pattern: source.clone(),
            source: e,
        };

        let line = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(invalid)?;
        let content = Regex::new(&source).map_err(invalid)?;

        Ok(Self {
            source,
            line,
            content,
        })
    }

    /// The pattern as the user wrote it
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Find the identifier of the tag under `column`.
    ///
    /// `column` is an editor character offset (UTF-16 code units). A match
    /// spanning `[start, end)` is hit when `start <= column <= end`, so a
    /// cursor resting right after a tag still selects it. Matches are tried
    /// left to right and the first hit with a non-empty group 1 wins.
    pub fn locate(&self, line: &str, column: u32) -> Option<Identifier> {
        let column = column as usize;
        let mut matches = 0usize;

        for caps in self.line.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            matches += 1;

            let start = utf16_offset(line, whole.start());
            let end = start + whole.as_str().encode_utf16().count();
            trace!(
                "match {}: {:?} at {}-{}, group 1 = {:?}",
                matches,
                whole.as_str(),
                start,
                end,
                caps.get(1).map(|m| m.as_str())
            );

            if start <= column
                && column <= end
                && let Some(id) = caps.get(1).and_then(|m| Identifier::new(m.as_str()))
            {
                return Some(id);
            }
        }

        trace!("{} matches on line, none usable at column {}", matches, column);
        None
    }

    /// Whether `text` holds an occurrence whose group 1 equals `id` exactly.
    ///
    /// Uses the verbatim (case-sensitive) compilation and stops at the first
    /// equal capture.
    pub fn occurs_in(&self, text: &str, id: &Identifier) -> bool {
        self.content
            .captures_iter(text)
            .any(|caps| caps.get(1).is_some_and(|m| m.as_str() == id.as_str()))
    }
}

/// Compile `pattern` and look up the tag under `column` in one go.
pub fn locate(line: &str, column: u32, pattern: &str) -> Result<Option<Identifier>> {
    Ok(TagPattern::new(pattern)?.locate(line, column))
}

/// UTF-16 length of `line[..byte]`
fn utf16_offset(line: &str, byte: usize) -> usize {
    line[..byte].encode_utf16().count()
}
