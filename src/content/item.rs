//! Content item models: the shared record plus the Post and Page variants

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::{Path, PathBuf};

use super::frontmatter::FrontMatter;
use super::permalink::is_markdown_extension;

/// Source document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Markdown,
    Html,
}

impl FileType {
    /// Detect the file type from the extension; `None` for unsupported files
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if is_markdown_extension(ext) {
            Some(FileType::Markdown)
        } else if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") {
            Some(FileType::Html)
        } else {
            None
        }
    }
}

/// A single content source file, fully resolved
///
/// Everything except `output_href` is fixed at construction; the href is
/// filled in by the rendering stage.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    id: String,
    source_path: PathBuf,
    relative_path: PathBuf,
    file_type: FileType,
    is_draft: bool,
    front_matter: FrontMatter,
    raw_content: String,
    html_content: String,
    permalink: String,
    output_href: Option<String>,
    output_path: PathBuf,
}

/// Fields needed to construct a [`ContentItem`]
#[derive(Debug, Clone)]
pub(crate) struct ItemParts {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub file_type: FileType,
    pub is_draft: bool,
    pub front_matter: FrontMatter,
    pub raw_content: String,
    pub html_content: String,
    pub permalink: String,
    pub output_path: PathBuf,
}

impl ContentItem {
    pub(crate) fn new(parts: ItemParts) -> Self {
        Self {
            id: path_id(&parts.relative_path),
            source_path: parts.source_path,
            relative_path: parts.relative_path,
            file_type: parts.file_type,
            is_draft: parts.is_draft,
            front_matter: parts.front_matter,
            raw_content: parts.raw_content,
            html_content: parts.html_content,
            permalink: parts.permalink,
            output_href: None,
            output_path: parts.output_path,
        }
    }

    /// Source-relative path with `/` separators, unique within a run
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_draft(&self) -> bool {
        self.is_draft
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    pub fn html_content(&self) -> &str {
        &self.html_content
    }

    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn output_href(&self) -> Option<&str> {
        self.output_href.as_deref()
    }

    /// Record the relative link computed by the renderer
    pub fn set_output_href(&mut self, href: impl Into<String>) {
        self.output_href = Some(href.into());
    }

    /// Title from front-matter, or the filename stem
    pub fn title(&self) -> &str {
        self.front_matter.title().unwrap_or_else(|| {
            self.relative_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
        })
    }

    pub fn tags(&self) -> Vec<&str> {
        self.front_matter.tags()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.front_matter.categories()
    }
}

fn path_id(relative_path: &Path) -> String {
    relative_path
        .iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A dated blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    #[serde(flatten)]
    item: ContentItem,

    /// Publication date
    date: DateTime<FixedOffset>,
}

impl Post {
    /// Build a post once the normalized front-matter carries a valid date
    pub fn from_item(item: ContentItem) -> Option<Self> {
        let date = item.front_matter.date()?;
        Some(Self { item, date })
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn item_mut(&mut self) -> &mut ContentItem {
        &mut self.item
    }
}

impl Deref for Post {
    type Target = ContentItem;

    fn deref(&self) -> &ContentItem {
        &self.item
    }
}

/// A standalone page
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Page {
    item: ContentItem,
}

impl Page {
    pub fn new(item: ContentItem) -> Self {
        Self { item }
    }

    pub fn item_mut(&mut self) -> &mut ContentItem {
        &mut self.item
    }
}

impl Deref for Page {
    type Target = ContentItem;

    fn deref(&self) -> &ContentItem {
        &self.item
    }
}

/// The built form of one source file
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Post(Post),
    Page(Page),
}

impl Entry {
    pub fn item(&self) -> &ContentItem {
        match self {
            Entry::Post(post) => &post.item,
            Entry::Page(page) => &page.item,
        }
    }

    pub fn item_mut(&mut self) -> &mut ContentItem {
        match self {
            Entry::Post(post) => post.item_mut(),
            Entry::Page(page) => page.item_mut(),
        }
    }

    /// Layout from front-matter, defaulting by variant
    pub fn layout(&self) -> &str {
        self.item().front_matter().layout().unwrap_or(match self {
            Entry::Post(_) => "post",
            Entry::Page(_) => "page",
        })
    }

    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Entry::Post(post) => Some(post.date()),
            Entry::Page(_) => None,
        }
    }
}

impl Deref for Entry {
    type Target = ContentItem;

    fn deref(&self) -> &ContentItem {
        self.item()
    }
}
