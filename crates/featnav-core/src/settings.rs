//! Lookup settings
//!
//! Settings are handed to the navigator with every request; nothing below
//! the navigator reads configuration on its own.

use serde::{Deserialize, Serialize};

use crate::resolver::DEFAULT_MAX_RESULTS;
use crate::scanner::DEFAULT_MAX_CANDIDATES;

/// Settings for one lookup, named like the editor settings they come from
/// (`featureNavigator.tagPattern` and friends).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Regex with one capture group for the identifier, e.g. `@case\((\d+)\)`
    pub tag_pattern: Option<String>,

    /// Glob template; `${caseNumber}` is replaced by the identifier
    pub search_pattern: String,

    /// Directory, relative to the document's workspace folder, that scopes
    /// filename searches
    pub relative_root: String,

    /// Also scan `.feature` file contents for the tag
    pub search_in_content: bool,

    /// Cap on filename matches
    pub max_results: usize,

    /// Cap on files read by a content scan
    pub max_content_candidates: usize,

    /// Skip files excluded by `.gitignore` and friends. Off by default, so
    /// generated suites in ignored directories are still found.
    pub use_ignore_files: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tag_pattern: None,
            search_pattern: String::new(),
            relative_root: String::new(),
            search_in_content: false,
            max_results: DEFAULT_MAX_RESULTS,
            max_content_candidates: DEFAULT_MAX_CANDIDATES,
            use_ignore_files: false,
        }
    }
}

impl Settings {
    /// The configured tag pattern, treating an empty string as unset
    pub fn tag_pattern(&self) -> Option<&str> {
        self.tag_pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// The relative root, treating an empty string as unset
    pub fn relative_root(&self) -> Option<&str> {
        Some(self.relative_root.as_str()).filter(|r| !r.is_empty())
    }
}
