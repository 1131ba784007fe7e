//! Filename lookup: turn an identifier into a glob and list the files it hits

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::location::Match;
use crate::settings::Settings;
use crate::sources::{FileFinder, FindQuery};
use crate::tag::Identifier;
use crate::workspace::DocumentContext;

/// Token in `searchPattern` replaced by the identifier
pub const PLACEHOLDER: &str = "${caseNumber}";

/// Cap on filename matches per lookup
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Substitute the identifier for the first placeholder in `template`.
pub fn expand_template(template: &str, id: &Identifier) -> String {
    template.replacen(PLACEHOLDER, id.as_str(), 1)
}

/// Where a filename search runs.
///
/// A non-empty `relative_root` narrows the search to that directory inside the
/// document's workspace folder. Without a containing folder the relative root
/// is ignored and every workspace folder is searched.
pub fn search_roots(relative_root: Option<&str>, document: &DocumentContext) -> Vec<PathBuf> {
    if let Some(relative) = relative_root.filter(|r| !r.is_empty())
        && let Some(folder) = &document.workspace_folder
    {
        return vec![folder.join(relative)];
    }
    document.search_roots.clone()
}

/// List every file whose path matches the expanded `searchPattern`.
///
/// Matches come back in the finder's order and are anchored at the start of
/// the file. An empty template matches nothing.
pub async fn resolve_by_filename(
    finder: &dyn FileFinder,
    id: &Identifier,
    settings: &Settings,
    document: &DocumentContext,
    cancel: &CancellationToken,
) -> Result<Vec<Match>> {
    let glob = expand_template(&settings.search_pattern, id);
    debug!("Filename glob: {:?}", glob);
    if glob.is_empty() {
        return Ok(Vec::new());
    }

    let query = FindQuery::new(search_roots(settings.relative_root(), document), glob)
        .max_results(settings.max_results)
        .use_ignore_files(settings.use_ignore_files);
    let files = finder.find(&query, cancel).await?;
    for file in &files {
        debug!("Matched file {}", file.display());
    }

    Ok(files.into_iter().map(Match::filename).collect())
}
