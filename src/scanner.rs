use crate::config::normalize_extension;
use crate::error::{IngestError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A regular file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// File name without its extension (`apple` for `apple.tif`).
    pub base_name: String,
    /// Lowercased extension without the dot.
    pub extension: String,
}

impl FileEntry {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let base_name = path.file_stem()?.to_string_lossy().into_owned();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Some(Self {
            path,
            base_name,
            extension,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.base_name.clone())
    }
}

/// Recursive, extension-filtered directory walk.
///
/// The scanner only holds the root and filter; every call to [`entries`]
/// starts a fresh traversal, so a scanner can be iterated more than once.
///
/// [`entries`]: FileScanner::entries
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: PathBuf,
    extensions: Vec<String>,
    include_hidden: bool,
}

impl FileScanner {
    /// Fails with [`IngestError::PathNotFound`] unless `root` is an existing directory.
    pub fn new<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Self> {
        if !root.is_dir() {
            return Err(IngestError::PathNotFound(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| IngestError::PathNotFound(root.to_path_buf()))?;

        Ok(Self {
            root,
            extensions: extensions
                .iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
            include_hidden: true,
        })
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily yields matching files at every depth, sorted by name within each
    /// directory. Symlinks and unreadable entries are logged and skipped.
    pub fn entries(&self) -> impl Iterator<Item = FileEntry> + '_ {
        let include_hidden = self.include_hidden;
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| include_hidden || e.depth() == 0 || !is_hidden(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(
                        path = ?e.path(),
                        "Skipping unreadable entry: {}", e
                    );
                    None
                }
            })
            .filter(|entry| {
                if entry.path_is_symlink() {
                    debug!(path = ?entry.path(), "Skipping symbolic link");
                    return false;
                }
                entry.file_type().is_file()
            })
            .filter(|entry| matches_extension(entry.path(), &self.extensions))
            .filter_map(|entry| FileEntry::from_path(entry.into_path()))
    }
}

/// Case-insensitive extension check; `extensions` must already be normalized.
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            extensions.iter().any(|wanted| *wanted == ext_lower)
        })
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
