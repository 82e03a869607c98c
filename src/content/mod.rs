//! Content module - ingestion of posts, pages and drafts
//!
//! The pipeline for one run:
//! discover files → [`ContentLoader`] builds an [`Entry`] per file →
//! [`SiteContent::assemble`] partitions and sorts them.

pub mod classify;
pub mod collection;
pub mod diagnostics;
pub mod discover;
mod frontmatter;
mod item;
pub mod loader;
mod markdown;
pub mod normalize;
pub mod permalink;

pub use classify::ItemType;
pub use collection::SiteContent;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics};
pub use frontmatter::{FieldValue, FrontMatter};
pub use item::{ContentItem, Entry, FileType, Page, Post};
pub use loader::ContentLoader;
pub use markdown::{DocumentRenderer, MarkdownRenderer, RenderedDocument};
pub use normalize::FrontMatterNormalizer;
