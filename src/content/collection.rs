//! Site content assembly: partition built entries and sort each collection

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::item::{ContentItem, Entry, Page, Post};

/// Every item of a run, ready for rendering
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteContent {
    /// Published posts, newest first
    pub posts: Vec<Post>,
    /// Published pages, by permalink
    pub pages: Vec<Page>,
    /// Drafts of any shape, by permalink
    pub drafts: Vec<Entry>,
}

impl SiteContent {
    /// Partition and sort entries given in discovery order
    ///
    /// Entries repeating an id already seen are dropped. Permalink collisions
    /// are reported but both entries are kept.
    pub fn assemble(entries: Vec<Entry>, sink: &dyn DiagnosticSink) -> Self {
        let mut content = SiteContent::default();
        let mut ids: HashSet<String> = HashSet::new();
        let mut permalinks: HashMap<String, String> = HashMap::new();

        for entry in entries {
            if !ids.insert(entry.id().to_string()) {
                sink.emit(Diagnostic::new(
                    entry.source_path(),
                    DiagnosticKind::DuplicateId,
                    format!("Duplicate item id `{}`, skipped", entry.id()),
                ));
                continue;
            }
            if let Some(first) = permalinks.get(entry.permalink()) {
                sink.emit(Diagnostic::new(
                    entry.source_path(),
                    DiagnosticKind::PermalinkCollision,
                    format!("Permalink {} is also used by `{}`", entry.permalink(), first),
                ));
            } else {
                permalinks.insert(entry.permalink().to_string(), entry.id().to_string());
            }

            match entry {
                draft if draft.is_draft() => content.drafts.push(draft),
                Entry::Post(post) => content.posts.push(post),
                Entry::Page(page) => content.pages.push(page),
            }
        }

        content.sort();
        tracing::info!(
            "Assembled {} posts, {} pages and {} drafts",
            content.posts.len(),
            content.pages.len(),
            content.drafts.len()
        );
        content
    }

    /// Posts by date descending (stable), pages and drafts by permalink bytes
    fn sort(&mut self) {
        self.posts.sort_by(|a, b| b.date().cmp(&a.date()));
        self.pages
            .sort_by(|a, b| a.permalink().as_bytes().cmp(b.permalink().as_bytes()));
        self.drafts
            .sort_by(|a, b| a.permalink().as_bytes().cmp(b.permalink().as_bytes()));
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.pages.len() + self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items: posts, then pages, then drafts
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.posts
            .iter()
            .map(|p| &**p)
            .chain(self.pages.iter().map(|p| &**p))
            .chain(self.drafts.iter().map(Entry::item))
    }

    pub fn find(&self, id: &str) -> Option<&ContentItem> {
        self.items().find(|item| item.id() == id)
    }

    /// Tag usage counts over published posts
    pub fn tags(&self) -> BTreeMap<String, usize> {
        count(self.posts.iter().flat_map(|p| p.tags()))
    }

    /// Category usage counts over published posts
    pub fn categories(&self) -> BTreeMap<String, usize> {
        count(self.posts.iter().flat_map(|p| p.categories()))
    }
}

fn count<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}
