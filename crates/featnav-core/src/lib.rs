//! featnav-core - jump from a comment tag to the files it names
//!
//! A *tag* is any text matched by a user-configured regular expression whose
//! first capture group is an identifier, such as a test-case number:
//!
//! ```text
//! // TAG:42 fix login redirect
//! @case("123456")
//! ```
//!
//! Given the line under the cursor, this crate finds the tag the cursor is on,
//! then looks for files associated with its identifier in two ways:
//!
//! - by **filename**, expanding a glob template such as
//!   `**/*${caseNumber}*.feature`
//! - optionally by **content**, scanning `.feature` files for a tag with the
//!   same identifier
//!
//! # Features
//!
//! - `walk` - Enable [`WalkFinder`] for directory walking, optionally honoring `.gitignore` (brings in `ignore`)
//!
//! # Locating a tag
//!
//! ```
//! use featnav_core::TagPattern;
//!
//! let pattern = TagPattern::new(r"TAG:(\d+)").unwrap();
//! let id = pattern.locate("// TAG:42 fix bug", 8).unwrap();
//! assert_eq!(id.as_str(), "42");
//!
//! // The cursor only has to be somewhere on the tag
//! assert_eq!(pattern.locate("// TAG:42 fix bug", 3).unwrap().as_str(), "42");
//! assert!(pattern.locate("// TAG:42 fix bug", 14).is_none());
//! ```
//!
//! # Resolving a definition
//!
//! Use [`MemoryFiles`] when you don't want to hit the filesystem:
//!
//! ```
//! use std::sync::Arc;
//! use featnav_core::{Definition, Match, MemoryFiles, Navigator, NullNotifier, Settings, Workspace};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let files = Arc::new(
//!     MemoryFiles::new()
//!         .add("/ws/features/login-42.feature", "Feature: Login")
//!         .add("/ws/features/other.feature", "Feature: Other"),
//! );
//! let navigator = Navigator::new(files.clone(), files, Arc::new(NullNotifier));
//!
//! let settings = Settings {
//!     tag_pattern: Some(r"TAG:(\d+)".into()),
//!     search_pattern: "**/*${caseNumber}*.feature".into(),
//!     ..Settings::default()
//! };
//! let document = Workspace::new(["/ws"]).context_for("/ws/src/login.ts", "// TAG:42", 6);
//!
//! let definition = navigator
//!     .provide_definition(&settings, &document, &CancellationToken::new())
//!     .await;
//! assert_eq!(
//!     definition,
//!     Some(Definition::Single(Match::filename("/ws/features/login-42.feature")))
//! );
//! # });
//! ```

mod error;
mod location;
mod navigator;
mod resolver;
mod scanner;
mod settings;
mod sources;
mod tag;
mod workspace;

pub use error::{Error, Result};
pub use location::{Definition, Match, MatchKind};
pub use navigator::{INVALID_PATTERN_MESSAGE, Navigator, Notifier, NullNotifier};
pub use resolver::{
    DEFAULT_MAX_RESULTS, PLACEHOLDER, expand_template, resolve_by_filename, search_roots,
};
pub use scanner::{CONTENT_GLOB, ContentScanner, DEFAULT_MAX_CANDIDATES, SCAN_CONCURRENCY};
pub use settings::Settings;
pub use sources::{FileFinder, FileReader, FindQuery, FsReader, MemoryFiles};
pub use tag::{Identifier, TagPattern, locate};
pub use workspace::{DocumentContext, Workspace};

#[cfg(feature = "walk")]
pub use sources::WalkFinder;
