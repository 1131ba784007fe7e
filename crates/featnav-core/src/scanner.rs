//! Content lookup: find `.feature` files that carry the same tag
//!
//! Candidate files are read and scanned concurrently. Each file contributes
//! at most one [`Match`], and a file that cannot be read is logged and
//! skipped without failing the lookup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures_util::{StreamExt, future, stream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::location::Match;
use crate::sources::{FileFinder, FileReader, FindQuery};
use crate::tag::{Identifier, TagPattern};

/// Files considered by a content scan
pub const CONTENT_GLOB: &str = "**/*.feature";

/// Cap on candidate files per scan
pub const DEFAULT_MAX_CANDIDATES: usize = 1000;

/// Reads in flight at once
pub const SCAN_CONCURRENCY: usize = 32;

/// Scans candidate files for an identifier
pub struct ContentScanner<'a> {
    finder: &'a dyn FileFinder,
    reader: &'a dyn FileReader,
    roots: Vec<PathBuf>,
    max_candidates: usize,
    use_ignore_files: bool,
}

impl<'a> ContentScanner<'a> {
    pub fn new(
        finder: &'a dyn FileFinder,
        reader: &'a dyn FileReader,
        roots: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        Self {
            finder,
            reader,
            roots: roots.into_iter().map(Into::into).collect(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            use_ignore_files: false,
        }
    }

    pub fn max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn use_ignore_files(mut self, yes: bool) -> Self {
        self.use_ignore_files = yes;
        self
    }

    /// Return one content match per candidate file holding a tag whose
    /// group 1 equals `id`, skipping `excluded` paths.
    ///
    /// Result order between files is unspecified.
    pub async fn scan(
        &self,
        id: &Identifier,
        pattern: &TagPattern,
        excluded: &HashSet<PathBuf>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Match>> {
        let query = FindQuery::new(&self.roots, CONTENT_GLOB)
            .max_results(self.max_candidates)
            .use_ignore_files(self.use_ignore_files);
        let candidates = self.finder.find(&query, cancel).await?;
        debug!("Scanning {} candidate files for content", candidates.len());

        let matches = stream::iter(candidates.into_iter().filter(|path| !excluded.contains(path)))
            .map(|path| async move { self.scan_file(&path, id, pattern, cancel).await })
            .buffer_unordered(SCAN_CONCURRENCY)
            .filter_map(future::ready)
            .collect::<Vec<_>>()
            .await;

        Ok(matches)
    }

    async fn scan_file(
        &self,
        path: &Path,
        id: &Identifier,
        pattern: &TagPattern,
        cancel: &CancellationToken,
    ) -> Option<Match> {
        // Reads already under way finish; new ones are not started
        if cancel.is_cancelled() {
            return None;
        }

        let bytes = match self.reader.read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        if pattern.occurs_in(&text, id) {
            debug!("Content match in {}", path.display());
            Some(Match::content(path))
        } else {
            None
        }
    }
}
