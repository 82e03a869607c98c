//! Content loader - builds content items from source files

use anyhow::Result;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::classify::{classify, ItemType};
use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::frontmatter::FrontMatter;
use super::item::{ContentItem, Entry, FileType, ItemParts, Page, Post};
use super::markdown::{DocumentRenderer, RenderedDocument};
use super::normalize::FrontMatterNormalizer;
use super::permalink::{output_path, resolve_permalink};
use crate::config::SitePaths;

/// Why a single file did not produce an item
#[derive(Debug, Error)]
enum Skip {
    #[error("Unsupported file extension, skipped")]
    UnsupportedExtension,

    #[error("Not under any content directory, skipped")]
    Unclassified,

    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to render document: {0:#}")]
    Render(anyhow::Error),

    #[error("Marked `published: false`, skipped")]
    Unpublished,

    #[error("Post has no valid `date`, skipped")]
    MissingDate,
}

impl Skip {
    fn kind(&self) -> DiagnosticKind {
        match self {
            Skip::UnsupportedExtension => DiagnosticKind::UnsupportedExtension,
            Skip::Unclassified => DiagnosticKind::Unclassified,
            Skip::Read(_) => DiagnosticKind::ReadFailed,
            Skip::Render(_) => DiagnosticKind::RenderFailed,
            Skip::Unpublished => DiagnosticKind::Unpublished,
            Skip::MissingDate => DiagnosticKind::MissingDate,
        }
    }
}

/// Builds [`Entry`] values from source files
///
/// Holds only read-only state, so one loader is shared by all build workers.
pub struct ContentLoader<'a> {
    paths: &'a SitePaths,
    renderer: &'a dyn DocumentRenderer,
    normalizer: FrontMatterNormalizer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(
        paths: &'a SitePaths,
        renderer: &'a dyn DocumentRenderer,
        normalizer: FrontMatterNormalizer,
    ) -> Self {
        Self {
            paths,
            renderer,
            normalizer,
        }
    }

    /// Build every file on a pool of `jobs` workers
    ///
    /// The result keeps the order of `files`. Files that fail are reported to
    /// `sink` and left out.
    pub fn load_all(
        &self,
        files: &[PathBuf],
        jobs: usize,
        sink: &dyn DiagnosticSink,
    ) -> Result<Vec<Entry>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .thread_name(|i| format!("quire-build-{}", i))
            .build()?;

        let entries: Vec<Entry> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|path| self.build(path, sink))
                .collect()
        });

        tracing::debug!("Built {} of {} files", entries.len(), files.len());
        Ok(entries)
    }

    /// Build a single file, reporting a diagnostic when it is skipped
    pub fn build(&self, path: &Path, sink: &dyn DiagnosticSink) -> Option<Entry> {
        match self.try_build(path, sink) {
            Ok(entry) => {
                tracing::debug!("Built {} -> {}", entry.id(), entry.permalink());
                Some(entry)
            }
            Err(skip) => {
                sink.emit(Diagnostic::new(path, skip.kind(), skip.to_string()));
                None
            }
        }
    }

    fn try_build(&self, path: &Path, sink: &dyn DiagnosticSink) -> Result<Entry, Skip> {
        let file_type = FileType::from_path(path).ok_or(Skip::UnsupportedExtension)?;
        let item_type = classify(path, self.paths).ok_or(Skip::Unclassified)?;

        let text = fs::read_to_string(path)?;
        let document = match file_type {
            FileType::Markdown => self
                .renderer
                .render_document(&text)
                .map_err(Skip::Render)?,
            FileType::Html => RenderedDocument {
                front_matter: FrontMatter::default(),
                html: text.clone(),
                raw: text,
            },
        };

        let front_matter = self.normalizer.normalize(document.front_matter, path, sink);

        let is_draft = item_type == ItemType::Draft || front_matter.flag("draft") == Some(true);
        if !is_draft && front_matter.published() == Some(false) {
            return Err(Skip::Unpublished);
        }

        let relative_path = self.relative_path(path, item_type);
        let permalink = resolve_permalink(
            &relative_path,
            &front_matter,
            item_type,
            self.paths.pages_dir_name(),
        );
        let output_path = output_path(&permalink, &self.paths.public);

        let item = ContentItem::new(ItemParts {
            source_path: path.to_path_buf(),
            relative_path,
            file_type,
            is_draft,
            front_matter,
            raw_content: document.raw,
            html_content: document.html,
            permalink,
            output_path,
        });

        match item_type {
            ItemType::Post => Post::from_item(item)
                .map(Entry::Post)
                .ok_or(Skip::MissingDate),
            ItemType::Draft | ItemType::Page => Ok(Entry::Page(Page::new(item))),
        }
    }

    /// Path relative to the source root
    ///
    /// A content root configured outside the source root is taken relative
    /// to its parent, so the root's own name stays the first component.
    fn relative_path(&self, path: &Path, item_type: ItemType) -> PathBuf {
        if let Ok(relative) = path.strip_prefix(&self.paths.source) {
            return relative.to_path_buf();
        }
        let root = match item_type {
            ItemType::Post => &self.paths.posts,
            ItemType::Draft => &self.paths.drafts,
            ItemType::Page => &self.paths.pages,
        };
        root.parent()
            .and_then(|parent| path.strip_prefix(parent).ok())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.file_name().map(PathBuf::from).unwrap_or_default())
    }
}
