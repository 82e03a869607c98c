//! Content file discovery

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::item::FileType;
use crate::config::SitePaths;

/// Find every candidate content file under the configured roots
///
/// Dotfiles, directories whose name starts with `_` and the assets root are
/// skipped. A content root is walked even when its own name starts with `_`.
/// Results are sorted so discovery order is stable across runs.
pub fn discover(paths: &SitePaths) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in paths.content_roots() {
        // Roots nested in the source root are covered by its walk
        if root != paths.source && root.starts_with(&paths.source) {
            continue;
        }
        if !root.is_dir() {
            tracing::debug!("Content directory {:?} does not exist, skipping", root);
            continue;
        }

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| keep_entry(e, paths))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && FileType::from_path(path).is_some() {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => tracing::warn!("Failed to read directory entry: {}", e),
            }
        }
    }

    files.sort();
    files.dedup();
    tracing::debug!("Discovered {} content files", files.len());
    files
}

fn keep_entry(entry: &DirEntry, paths: &SitePaths) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let path = entry.path();
    if is_content_root(path, paths) {
        return true;
    }
    if path == paths.assets || path == paths.public {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return false;
    }
    !(entry.file_type().is_dir() && name.starts_with('_'))
}

fn is_content_root(path: &Path, paths: &SitePaths) -> bool {
    paths.content_roots().iter().any(|root| *root == path)
}
