//! Workspace folders and the per-request document context

use std::path::{Path, PathBuf};

/// The folders an editor has open.
///
/// Tree-wide searches cover every folder; a configured `relativeRoot` is
/// resolved against the folder that contains the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    folders: Vec<PathBuf>,
}

impl Workspace {
    pub fn new(folders: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut workspace = Self::default();
        for folder in folders {
            workspace.add_folder(folder);
        }
        workspace
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Add a folder, ignoring duplicates
    pub fn add_folder(&mut self, folder: impl Into<PathBuf>) {
        let folder = folder.into();
        if !self.folders.contains(&folder) {
            self.folders.push(folder);
        }
    }

    pub fn remove_folder(&mut self, folder: &Path) {
        self.folders.retain(|f| f != folder);
    }

    /// The innermost folder containing `path`
    pub fn folder_for(&self, path: &Path) -> Option<&Path> {
        self.folders
            .iter()
            .filter(|folder| path.starts_with(folder))
            .max_by_key(|folder| folder.components().count())
            .map(PathBuf::as_path)
    }

    /// Build the context for a lookup at `column` on `line_text` of `path`
    pub fn context_for(
        &self,
        path: impl Into<PathBuf>,
        line_text: impl Into<String>,
        column: u32,
    ) -> DocumentContext {
        let path = path.into();
        DocumentContext {
            workspace_folder: self.folder_for(&path).map(Path::to_path_buf),
            search_roots: self.folders.clone(),
            path,
            line_text: line_text.into(),
            column,
        }
    }
}

/// Everything a lookup needs to know about where it was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContext {
    /// The document the cursor is in
    pub path: PathBuf,
    /// Text of the cursor's line
    pub line_text: String,
    /// Cursor column in UTF-16 code units
    pub column: u32,
    /// Workspace folder containing `path`, if any
    pub workspace_folder: Option<PathBuf>,
    /// Roots for tree-wide searches
    pub search_roots: Vec<PathBuf>,
}
