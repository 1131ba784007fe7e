//! The lookup behind "go to definition" on a tag
//!
//! 1. compile `tagPattern` (missing or invalid ends the lookup before any I/O)
//! 2. find the identifier under the cursor
//! 3. list files whose name matches the expanded `searchPattern`
//! 4. optionally scan `.feature` contents, skipping files found in step 3
//! 5. return nothing, one match, or every match (filename matches first)

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::location::Definition;
use crate::resolver::resolve_by_filename;
use crate::scanner::ContentScanner;
use crate::settings::Settings;
use crate::sources::{FileFinder, FileReader};
use crate::tag::TagPattern;
use crate::workspace::DocumentContext;

/// Shown to the user when `tagPattern` does not compile
pub const INVALID_PATTERN_MESSAGE: &str =
    "FeatureNavigator: Invalid tagPattern regex. Check your settings.";

/// Where interruptive error messages go (an editor popup, stderr, ...)
pub trait Notifier: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Drops every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn show_error(&self, _message: &str) {}
}

/// Resolves tags to files. Holds no per-request state.
#[derive(Clone)]
pub struct Navigator {
    finder: Arc<dyn FileFinder>,
    reader: Arc<dyn FileReader>,
    notifier: Arc<dyn Notifier>,
}

impl Navigator {
    pub fn new(
        finder: Arc<dyn FileFinder>,
        reader: Arc<dyn FileReader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            finder,
            reader,
            notifier,
        }
    }

    /// Navigator over the real file system
    #[cfg(feature = "walk")]
    pub fn from_fs(notifier: Arc<dyn Notifier>) -> Self {
        use crate::sources::{FsReader, WalkFinder};
        Self::new(Arc::new(WalkFinder::new()), Arc::new(FsReader), notifier)
    }

    /// Look up the tag under the cursor, logging failures instead of
    /// returning them.
    pub async fn provide_definition(
        &self,
        settings: &Settings,
        document: &DocumentContext,
        cancel: &CancellationToken,
    ) -> Option<Definition> {
        match self.resolve(settings, document, cancel).await {
            Ok(definition) => definition,
            Err(Error::MissingConfiguration) => {
                error!("No tagPattern configured");
                None
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Look up the tag under the cursor.
    ///
    /// An invalid pattern is reported to the notifier before the error is
    /// returned. Cancellation is not an error: whatever was found before the
    /// token fired is returned.
    pub async fn resolve(
        &self,
        settings: &Settings,
        document: &DocumentContext,
        cancel: &CancellationToken,
    ) -> Result<Option<Definition>> {
        debug!("Definition requested in {}", document.path.display());

        let source = settings.tag_pattern().ok_or(Error::MissingConfiguration)?;
        debug!("Using tagPattern: {}", source);

        let pattern = match TagPattern::new(source) {
            Ok(pattern) => pattern,
            Err(e) => {
                self.notifier.show_error(INVALID_PATTERN_MESSAGE);
                return Err(e);
            }
        };

        debug!(
            "Checking line {:?} at column {}",
            document.line_text, document.column
        );
        let Some(id) = pattern.locate(&document.line_text, document.column) else {
            debug!("No case number found at position");
            return Ok(None);
        };
        info!("Found case number: {}", id);

        let mut matches =
            resolve_by_filename(self.finder.as_ref(), &id, settings, document, cancel).await?;
        info!("Found {} matches by filename", matches.len());

        if settings.search_in_content && !cancel.is_cancelled() {
            let excluded: HashSet<PathBuf> = matches.iter().map(|m| m.path.clone()).collect();
            let content = ContentScanner::new(
                self.finder.as_ref(),
                self.reader.as_ref(),
                &document.search_roots,
            )
            .max_candidates(settings.max_content_candidates)
            .use_ignore_files(settings.use_ignore_files)
            .scan(&id, &pattern, &excluded, cancel)
            .await?;
            info!("Found {} matches by content", content.len());
            matches.extend(content);
        }

        if matches.is_empty() {
            info!("No locations found");
        } else {
            info!("Returning {} locations", matches.len());
        }
        Ok(Definition::from_matches(matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Match, MatchKind};
    use crate::sources::MemoryFiles;
    use crate::workspace::Workspace;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<String>>);

    impl Notifier for RecordingNotifier {
        fn show_error(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    struct Fixture {
        files: Arc<MemoryFiles>,
        notifier: Arc<RecordingNotifier>,
        navigator: Navigator,
    }

    fn fixture(files: MemoryFiles) -> Fixture {
        let files = Arc::new(files);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Navigator::new(files.clone(), files.clone(), notifier.clone());
        Fixture {
            files,
            notifier,
            navigator,
        }
    }

    fn settings(search_in_content: bool) -> Settings {
        Settings {
            tag_pattern: Some(r"TAG:(\d+)".into()),
            search_pattern: "**/*${caseNumber}*.feature".into(),
            search_in_content,
            ..Settings::default()
        }
    }

    fn at(column: u32) -> DocumentContext {
        Workspace::new(["/ws"]).context_for("/ws/src/login.ts", "// TAG:42 fix bug", column)
    }

    #[tokio::test]
    async fn test_single_filename_match() {
        let f = fixture(
            MemoryFiles::new()
                .add("/ws/features/login-42.feature", "Feature: Login")
                .add("/ws/features/other.feature", "Feature: Other"),
        );

        let def = f
            .navigator
            .resolve(&settings(false), &at(8), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            def,
            Some(Definition::Single(Match::filename("/ws/features/login-42.feature")))
        );
        assert_eq!(f.files.reads(), 0);
    }

    #[tokio::test]
    async fn test_cursor_on_tag_prefix_resolves_too() {
        let f = fixture(MemoryFiles::new().add("/ws/features/login-42.feature", ""));
        let def = f
            .navigator
            .resolve(&settings(false), &at(3), &CancellationToken::new())
            .await
            .unwrap();
        assert!(def.is_some());
    }

    #[tokio::test]
    async fn test_content_only_match_is_single() {
        let f = fixture(
            MemoryFiles::new()
                .add("/ws/features/other.feature", "Feature: Other\n  # TAG:42\n")
                .add("/ws/features/unrelated.feature", "Feature: Unrelated\n"),
        );

        let def = f
            .navigator
            .resolve(&settings(true), &at(8), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            def,
            Some(Definition::Single(Match::content("/ws/features/other.feature")))
        );
    }

    #[tokio::test]
    async fn test_no_match_anywhere() {
        let f = fixture(MemoryFiles::new().add("/ws/features/other.feature", "# TAG:7"));
        let def = f
            .navigator
            .resolve(&settings(true), &at(8), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(def, None);
        assert!(f.notifier.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filename_matches_precede_content_matches() {
        let f = fixture(
            MemoryFiles::new()
                .add("/ws/a.feature", "# TAG:42")
                .add("/ws/features/login-42.feature", "# TAG:42")
                .add("/ws/b.feature", "# TAG:42")
                .add("/ws/specs/pay-42.feature", ""),
        );

        let def = f
            .navigator
            .resolve(&settings(true), &at(8), &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        let matches = def.into_matches();

        assert_eq!(matches.len(), 4);
        let kinds: Vec<_> = matches.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MatchKind::Filename,
                MatchKind::Filename,
                MatchKind::Content,
                MatchKind::Content
            ]
        );

        // login-42 matched by name, so the content scan does not report it again
        let login = matches
            .iter()
            .filter(|m| m.path == PathBuf::from("/ws/features/login-42.feature"))
            .count();
        assert_eq!(login, 1);
    }

    #[tokio::test]
    async fn test_content_scan_disabled_by_default() {
        let f = fixture(MemoryFiles::new().add("/ws/other.feature", "# TAG:42"));
        let def = f
            .navigator
            .resolve(&settings(false), &at(8), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(def, None);
        assert_eq!(f.files.reads(), 0);
    }

    #[tokio::test]
    async fn test_cursor_off_tag_does_no_io() {
        let f = fixture(MemoryFiles::new().add("/ws/features/login-42.feature", ""));
        let def = f
            .navigator
            .resolve(&settings(true), &at(14), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(def, None);
        assert_eq!(f.files.finds(), 0);
    }

    #[tokio::test]
    async fn test_invalid_pattern_notifies_and_aborts() {
        let f = fixture(MemoryFiles::new().add("/ws/features/login-42.feature", "# TAG:42"));
        let broken = Settings {
            tag_pattern: Some(r"TAG:(\d+".into()),
            ..settings(true)
        };

        let err = f
            .navigator
            .resolve(&broken, &at(8), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert_eq!(
            *f.notifier.0.lock().unwrap(),
            vec![INVALID_PATTERN_MESSAGE.to_string()]
        );
        assert_eq!(f.files.finds(), 0);
        assert_eq!(f.files.reads(), 0);

        // The infallible entry point swallows the error but still notifies
        let def = f
            .navigator
            .provide_definition(&broken, &at(8), &CancellationToken::new())
            .await;
        assert_eq!(def, None);
        assert_eq!(f.notifier.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_pattern() {
        let f = fixture(MemoryFiles::new().add("/ws/features/login-42.feature", ""));
        let unset = Settings {
            tag_pattern: None,
            ..settings(true)
        };

        let err = f
            .navigator
            .resolve(&unset, &at(8), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingConfiguration));

        let def = f
            .navigator
            .provide_definition(&unset, &at(8), &CancellationToken::new())
            .await;
        assert_eq!(def, None);
        assert!(f.notifier.0.lock().unwrap().is_empty());
        assert_eq!(f.files.finds(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_lookup_returns_nothing() {
        let f = fixture(
            MemoryFiles::new()
                .add("/ws/features/login-42.feature", "")
                .add("/ws/other.feature", "# TAG:42"),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let def = f.navigator.resolve(&settings(true), &at(8), &cancel).await.unwrap();
        assert_eq!(def, None);
        assert_eq!(f.files.reads(), 0);
    }

    /// Fires the token once the first search has returned
    struct CancelAfterFind {
        files: Arc<MemoryFiles>,
        cancel: CancellationToken,
    }

    #[async_trait::async_trait]
    impl FileFinder for CancelAfterFind {
        async fn find(
            &self,
            query: &crate::sources::FindQuery,
            cancel: &CancellationToken,
        ) -> Result<Vec<PathBuf>> {
            let found = self.files.find(query, cancel).await;
            self.cancel.cancel();
            found
        }
    }

    #[tokio::test]
    async fn test_cancelled_midway_keeps_filename_matches() {
        let files = Arc::new(
            MemoryFiles::new()
                .add("/ws/login-42.feature", "")
                .add("/ws/other.feature", "# TAG:42"),
        );
        let cancel = CancellationToken::new();
        let finder = Arc::new(CancelAfterFind {
            files: files.clone(),
            cancel: cancel.clone(),
        });
        let navigator = Navigator::new(finder, files.clone(), Arc::new(NullNotifier));

        let def = navigator.resolve(&settings(true), &at(8), &cancel).await.unwrap();

        assert_eq!(
            def,
            Some(Definition::Single(Match::filename("/ws/login-42.feature")))
        );
        // The content scan never started
        assert_eq!(files.finds(), 1);
        assert_eq!(files.reads(), 0);
    }
}
