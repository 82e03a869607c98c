//! Source file classification by configured directory roots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::SitePaths;

/// What kind of item a source file becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Post,
    Draft,
    Page,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Post => "post",
            ItemType::Draft => "draft",
            ItemType::Page => "page",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" | "posts" => Ok(ItemType::Post),
            "draft" | "drafts" => Ok(ItemType::Draft),
            "page" | "pages" => Ok(ItemType::Page),
            other => Err(format!(
                "Unknown item type: {}. Available: post, page, draft",
                other
            )),
        }
    }
}

/// Classify an absolute source path
///
/// Posts win over drafts, and drafts over pages, so nested layouts such as a
/// drafts directory inside the pages root resolve to the more specific type.
/// Files directly in the source root are pages. Anything else is `None`.
pub fn classify(path: &Path, paths: &SitePaths) -> Option<ItemType> {
    if path.starts_with(&paths.posts) {
        Some(ItemType::Post)
    } else if path.starts_with(&paths.drafts) {
        Some(ItemType::Draft)
    } else if path.starts_with(&paths.pages) || path.parent() == Some(paths.source.as_path()) {
        Some(ItemType::Page)
    } else {
        None
    }
}
