//! Navigation results

use std::path::{Path, PathBuf};

use serde::Serialize;

/// How a file was associated with an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The file name matched the expanded `searchPattern`
    Filename,
    /// The file contents hold a tag with the same identifier
    Content,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Filename => "filename",
            MatchKind::Content => "content",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file associated with an identifier.
///
/// Always anchored at the start of the file; content matches do not record
/// where inside the file the tag was seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Match {
    pub path: PathBuf,
    pub kind: MatchKind,
}

impl Match {
    /// Anchor line (0-indexed)
    pub const LINE: u32 = 0;
    /// Anchor column (0-indexed)
    pub const COLUMN: u32 = 0;

    pub fn filename(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: MatchKind::Filename,
        }
    }

    pub fn content(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: MatchKind::Content,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What a lookup resolved to: one file, or several in result order
/// (filename matches first, then content matches).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Definition {
    Single(Match),
    Many(Vec<Match>),
}

impl Definition {
    /// `None` for an empty list, `Single` for exactly one match
    pub fn from_matches(mut matches: Vec<Match>) -> Option<Self> {
        match matches.len() {
            0 => None,
            1 => matches.pop().map(Definition::Single),
            _ => Some(Definition::Many(matches)),
        }
    }

    pub fn matches(&self) -> &[Match] {
        match self {
            Definition::Single(m) => std::slice::from_ref(m),
            Definition::Many(ms) => ms,
        }
    }

    pub fn into_matches(self) -> Vec<Match> {
        match self {
            Definition::Single(m) => vec![m],
            Definition::Many(ms) => ms,
        }
    }
}
