//! Permalink and output path resolution
//!
//! Both functions here are pure: the same inputs always give the same
//! result, and neither touches the file system.
//!
//! Permalink shapes:
//!
//! ```text
//! posts/2024-01-15-hello-world.md   -> /blog/hello-world/
//! drafts/idea.md                    -> /drafts/idea/
//! pages/about.md                    -> /about/
//! pages/projects/index.md           -> /projects/
//! index.md                          -> /
//! pages/contact.html                -> /contact.html
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

use super::classify::ItemType;
use super::frontmatter::FrontMatter;

lazy_static! {
    static ref DATE_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}-").unwrap();
}

const POSTS_SEGMENT: &str = "blog";
const DRAFTS_SEGMENT: &str = "drafts";
const INDEX_SLUG: &str = "index";

/// Lowercase, URL-safe, separators collapsed to a single `-`
pub fn slugify(s: &str) -> String {
    slug::slugify(s)
}

/// Strip a leading `YYYY-MM-DD-` from a post filename stem
pub fn strip_date_prefix(stem: &str) -> &str {
    match DATE_PREFIX.find(stem) {
        Some(m) => &stem[m.end()..],
        None => stem,
    }
}

/// Whether an extension names a Markdown document
pub fn is_markdown_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
}

/// Resolve the slug of an item
fn resolve_slug(stem: &str, front_matter: &FrontMatter, item_type: ItemType) -> String {
    if let Some(slug) = front_matter.slug() {
        return slugify(&slug);
    }
    if item_type == ItemType::Post {
        let slug = slugify(strip_date_prefix(stem));
        if !slug.is_empty() {
            return slug;
        }
    }
    slugify(stem)
}

/// Compute the canonical URL path of an item
///
/// `relative_path` is the source file path relative to the source root and
/// `pages_dir_name` the final component of the pages root, which is removed
/// from page URLs.
pub fn resolve_permalink(
    relative_path: &Path,
    front_matter: &FrontMatter,
    item_type: ItemType,
    pages_dir_name: &str,
) -> String {
    let stem = relative_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let slug = resolve_slug(stem, front_matter, item_type);
    let is_index = slug == INDEX_SLUG;

    let mut segments: Vec<String> = match item_type {
        ItemType::Post => vec![POSTS_SEGMENT.to_string(), slug],
        ItemType::Draft => vec![DRAFTS_SEGMENT.to_string(), slug],
        ItemType::Page => {
            let mut segments = page_directories(relative_path, pages_dir_name);
            if !is_index {
                segments.push(slug);
            }
            segments
        }
    };
    segments.retain(|s| !s.is_empty());

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut permalink = format!("/{}", segments.join("/"));
    match literal_extension(relative_path) {
        Some(ext) if !is_index => {
            permalink.push('.');
            permalink.push_str(&ext);
        }
        _ => permalink.push('/'),
    }
    permalink
}

/// Directory components of a page, without the pages root, each slugified
fn page_directories(relative_path: &Path, pages_dir_name: &str) -> Vec<String> {
    let mut dirs: Vec<&str> = relative_path
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(name) => name.to_str(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if let Some(pos) = dirs.iter().position(|d| *d == pages_dir_name) {
        dirs.remove(pos);
    }

    dirs.into_iter().map(slugify).collect()
}

/// The lowercased extension of a source file that should stay in its URL
fn literal_extension(relative_path: &Path) -> Option<String> {
    let ext = relative_path.extension()?.to_str()?;
    if is_markdown_extension(ext) {
        return None;
    }
    let ext = slugify(ext);
    (!ext.is_empty()).then_some(ext)
}

/// Map a permalink to the file that holds it under `output_root`
///
/// `/a/b/` becomes `<output_root>/a/b/index.html`, `/a/b` becomes
/// `<output_root>/a/b.html` and `/a/b.xml` stays `<output_root>/a/b.xml`.
pub fn output_path(permalink: &str, output_root: &Path) -> PathBuf {
    let mut path = output_root.to_path_buf();
    let segments: Vec<&str> = permalink.split('/').filter(|s| !s.is_empty()).collect();

    match segments.split_last() {
        Some((last, dirs)) if !permalink.ends_with('/') => {
            path.extend(dirs);
            if Path::new(last).extension().is_some() {
                path.push(last);
            } else {
                path.push(format!("{}.html", last));
            }
        }
        _ => {
            path.extend(&segments);
            path.push("index.html");
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter::FieldValue;

    fn permalink(path: &str, item_type: ItemType) -> String {
        resolve_permalink(Path::new(path), &FrontMatter::default(), item_type, "pages")
    }

    fn with_slug(slug: &str) -> FrontMatter {
        [("slug".to_string(), FieldValue::Text(slug.to_string()))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_post_strips_date_prefix() {
        assert_eq!(
            permalink("posts/2024-01-15-hello-world.md", ItemType::Post),
            "/blog/hello-world/"
        );
        assert_eq!(permalink("posts/Plain Title.md", ItemType::Post), "/blog/plain-title/");
    }

    #[test]
    fn test_date_only_post_name_keeps_stem() {
        assert_eq!(
            permalink("posts/2024-01-15-.md", ItemType::Post),
            "/blog/2024-01-15/"
        );
    }

    #[test]
    fn test_slug_override_wins() {
        let fm = with_slug("My Custom Slug!");
        assert_eq!(
            resolve_permalink(
                Path::new("posts/2024-01-15-hello-world.md"),
                &fm,
                ItemType::Post,
                "pages"
            ),
            "/blog/my-custom-slug/"
        );
        // No date stripping for overrides
        let fm = with_slug("2024-01-15-kept");
        assert_eq!(
            resolve_permalink(Path::new("posts/x.md"), &fm, ItemType::Post, "pages"),
            "/blog/2024-01-15-kept/"
        );
    }

    #[test]
    fn test_drafts() {
        assert_eq!(permalink("drafts/Work In Progress.md", ItemType::Draft), "/drafts/work-in-progress/");
        // Drafts keep date prefixes
        assert_eq!(
            permalink("drafts/2024-02-02-idea.md", ItemType::Draft),
            "/drafts/2024-02-02-idea/"
        );
    }

    #[test]
    fn test_pages() {
        assert_eq!(permalink("pages/about.md", ItemType::Page), "/about/");
        assert_eq!(permalink("pages/projects/index.md", ItemType::Page), "/projects/");
        assert_eq!(
            permalink("pages/projects/rust/quire.md", ItemType::Page),
            "/projects/rust/quire/"
        );
        assert_eq!(permalink("index.md", ItemType::Page), "/");
        assert_eq!(permalink("pages/index.md", ItemType::Page), "/");
        assert_eq!(permalink("colophon.markdown", ItemType::Page), "/colophon/");
    }

    #[test]
    fn test_only_one_pages_component_removed() {
        assert_eq!(permalink("pages/docs/pages/x.md", ItemType::Page), "/docs/pages/x/");
    }

    #[test]
    fn test_page_directories_slugified() {
        assert_eq!(
            permalink("pages/My Projects/Index.md", ItemType::Page),
            "/my-projects/"
        );
    }

    #[test]
    fn test_literal_extension_kept() {
        assert_eq!(permalink("pages/contact.html", ItemType::Page), "/contact.html");
        assert_eq!(permalink("pages/docs/index.html", ItemType::Page), "/docs/");
        assert_eq!(permalink("index.html", ItemType::Page), "/");
        assert_eq!(permalink("pages/Makefile", ItemType::Page), "/makefile/");
    }

    #[test]
    fn test_permalink_is_pure() {
        let fm = with_slug("Same");
        let a = resolve_permalink(Path::new("pages/a/b.md"), &fm, ItemType::Page, "pages");
        let b = resolve_permalink(Path::new("pages/a/b.md"), &fm, ItemType::Page, "pages");
        assert_eq!(a, b);
    }

    #[test]
    fn test_markdown_permalinks_are_directory_style() {
        let re = Regex::new(r"^/([a-z0-9-]+/)*$").unwrap();
        let cases = [
            ("posts/2024-01-15-Ünïcödé Title.md", ItemType::Post),
            ("posts/__weird__ name!!.md", ItemType::Post),
            ("drafts/a  b.md", ItemType::Draft),
            ("pages/A/B C/d.md", ItemType::Page),
            ("index.md", ItemType::Page),
        ];
        for (path, item_type) in cases {
            let p = permalink(path, item_type);
            assert!(re.is_match(&p), "{} -> {}", path, p);
        }
    }

    #[test]
    fn test_output_path() {
        let root = Path::new("/out");
        assert_eq!(output_path("/", root), PathBuf::from("/out/index.html"));
        assert_eq!(
            output_path("/blog/hello-world/", root),
            PathBuf::from("/out/blog/hello-world/index.html")
        );
        assert_eq!(output_path("/about", root), PathBuf::from("/out/about.html"));
        assert_eq!(
            output_path("/feeds/atom.xml", root),
            PathBuf::from("/out/feeds/atom.xml")
        );
        assert_eq!(
            output_path("/contact.html", root),
            PathBuf::from("/out/contact.html")
        );
    }

    #[test]
    fn test_strip_date_prefix() {
        assert_eq!(strip_date_prefix("2024-01-15-hello"), "hello");
        assert_eq!(strip_date_prefix("2024-1-15-hello"), "2024-1-15-hello");
        assert_eq!(strip_date_prefix("hello-2024-01-15-"), "hello-2024-01-15-");
    }
}
