//! File providers for tag navigation
//!
//! The navigator never touches the file system directly. It asks a
//! [`FileFinder`] for paths matching a glob and a [`FileReader`] for their
//! bytes, so the same lookup runs against a real tree ([`WalkFinder`] and
//! [`FsReader`]) or an in-memory one ([`MemoryFiles`]).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A glob search over one or more roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindQuery {
    /// Directories to search; globs match paths relative to each root
    pub roots: Vec<PathBuf>,
    /// Include pattern, e.g. `**/*42*.feature`
    pub glob: String,
    /// Optional exclude pattern, relative like `glob`
    pub exclude: Option<String>,
    /// Upper bound on returned paths
    pub max_results: usize,
    /// Honor `.gitignore`, `.ignore` and git exclude files
    pub use_ignore_files: bool,
}

impl FindQuery {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>, glob: impl Into<String>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            glob: glob.into(),
            exclude: None,
            max_results: usize::MAX,
            use_ignore_files: false,
        }
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn use_ignore_files(mut self, yes: bool) -> Self {
        self.use_ignore_files = yes;
        self
    }
}

/// Enumerates files matching a [`FindQuery`].
///
/// Cancellation is cooperative: when the token fires, implementations stop
/// and return what they found so far.
#[async_trait]
pub trait FileFinder: Send + Sync {
    async fn find(&self, query: &FindQuery, cancel: &CancellationToken) -> Result<Vec<PathBuf>>;
}

/// Reads a whole file.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Fails with [`Error::Read`]
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Compile a VS Code style glob: `*` stays inside one path component.
///
/// Returns `None` (after logging) for patterns globset rejects.
pub(crate) fn compile_glob(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            warn!("Invalid glob pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// Include/exclude matchers for one query
struct QueryMatcher {
    include: GlobMatcher,
    exclude: Option<GlobMatcher>,
}

impl QueryMatcher {
    fn new(query: &FindQuery) -> Option<Self> {
        if query.glob.is_empty() {
            return None;
        }
        let include = compile_glob(&query.glob)?;
        let exclude = query
            .exclude
            .as_deref()
            .filter(|p| !p.is_empty())
            .and_then(compile_glob);
        Some(Self { include, exclude })
    }

    fn is_match(&self, relative: &Path) -> bool {
        self.include.is_match(relative)
            && !self.exclude.as_ref().is_some_and(|m| m.is_match(relative))
    }
}

/// Directory walker over the real file system
///
/// Every file under the roots is considered, including files in git-ignored
/// directories, unless the query sets `use_ignore_files`. `.git`
/// directories are always skipped. Returned paths are canonical, so the same
/// file reached through a symlink and through its real location compares
/// equal.
#[cfg(feature = "walk")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkFinder;

#[cfg(feature = "walk")]
impl WalkFinder {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "walk")]
#[async_trait]
impl FileFinder for WalkFinder {
    async fn find(&self, query: &FindQuery, cancel: &CancellationToken) -> Result<Vec<PathBuf>> {
        let query = query.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || walk(&query, &cancel, |_| {}))
            .await
            .map_err(|e| Error::Walk(e.to_string()))
    }
}

/// Walk the query's roots, calling `on_found` after each new match.
#[cfg(feature = "walk")]
fn walk(
    query: &FindQuery,
    cancel: &CancellationToken,
    mut on_found: impl FnMut(&Path),
) -> Vec<PathBuf> {
    use ignore::WalkBuilder;

    let mut found = Vec::new();
    let Some(matcher) = QueryMatcher::new(query) else {
        return found;
    };
    let mut seen = HashSet::new();
    let ignores = query.use_ignore_files;

    'roots: for root in &query.roots {
        let root = root.canonicalize().unwrap_or_else(|_| root.clone());
        if !root.is_dir() {
            debug!("Search root {} does not exist, skipping", root.display());
            continue;
        }

        let walker = WalkBuilder::new(&root)
            .follow_links(true)
            .hidden(false)
            .parents(ignores)
            .ignore(ignores)
            .git_ignore(ignores)
            .git_global(ignores)
            .git_exclude(ignores)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            if found.len() >= query.max_results {
                break 'roots;
            }
            if cancel.is_cancelled() {
                debug!("Walk cancelled after {} files", found.len());
                break 'roots;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            if !matcher.is_match(relative) {
                continue;
            }

            // Symlinked directories yield link paths; resolve them so the
            // filename and content phases agree on identity
            let path = entry
                .path()
                .canonicalize()
                .unwrap_or_else(|_| entry.path().to_path_buf());
            if seen.insert(path.clone()) {
                on_found(&path);
                found.push(path);
            }
        }
    }

    found
}

/// Reads files with `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

#[async_trait]
impl FileReader for FsReader {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory file tree (useful for testing and embedding)
///
/// Implements both [`FileFinder`] and [`FileReader`] and counts calls to each
/// so tests can assert that no I/O happened.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: Vec<(PathBuf, Option<Vec<u8>>)>,
    finds: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryFiles {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.into(), Some(content.into())));
        self
    }

    /// Add a file that shows up in listings but fails to read
    pub fn add_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push((path.into(), None));
        self
    }

    /// Number of `find` calls so far
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::Relaxed)
    }

    /// Number of `read` calls so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FileFinder for MemoryFiles {
    async fn find(&self, query: &FindQuery, cancel: &CancellationToken) -> Result<Vec<PathBuf>> {
        self.finds.fetch_add(1, Ordering::Relaxed);

        let mut found = Vec::new();
        let Some(matcher) = QueryMatcher::new(query) else {
            return Ok(found);
        };
        let mut seen = HashSet::new();

        'roots: for root in &query.roots {
            for (path, _) in &self.files {
                if found.len() >= query.max_results || cancel.is_cancelled() {
                    break 'roots;
                }
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                if matcher.is_match(relative) && seen.insert(path) {
                    found.push(path.clone());
                }
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl FileReader for MemoryFiles {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        match self.files.iter().find(|(p, _)| p == path) {
            Some((_, Some(content))) => Ok(content.clone()),
            Some((_, None)) => Err(Error::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "unreadable"),
            }),
            None => Err(Error::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }
}
