//! quire: content ingestion for a static blog generator
//!
//! This crate turns a tree of Markdown/HTML source files into classified,
//! sorted posts, pages and drafts with resolved permalinks and output paths,
//! ready for a rendering stage.

pub mod commands;
pub mod config;
pub mod content;

use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use thiserror::Error;

use config::{ConfigError, SiteConfig, SitePaths};
use content::{
    discover::discover, ContentLoader, Diagnostic, DiagnosticSink, Diagnostics, DocumentRenderer,
    FrontMatterNormalizer, MarkdownRenderer, SiteContent,
};

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Source directory not found: {0:?}")]
    SourceNotFound(PathBuf),

    #[error("Failed to determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error("Failed to start build workers: {0}")]
    Workers(#[source] anyhow::Error),
}

/// Result of one content run
#[derive(Debug, Clone)]
pub struct Build {
    pub content: SiteContent,
    /// Everything skipped or dropped, ordered by path
    pub diagnostics: Vec<Diagnostic>,
}

/// The main application: a site directory with resolved configuration
#[derive(Debug, Clone)]
pub struct Quire {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Resolved absolute directories
    pub paths: SitePaths,
    /// Timezone for dates without an offset
    pub timezone: Option<Tz>,
}

impl Quire {
    /// Create a new instance from a site directory, loading its config file
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, Error> {
        let base_dir = absolute(base_dir.as_ref())?;
        let config = SiteConfig::load_from_dir(&base_dir)?;
        Self::with_config(config, base_dir)
    }

    /// Create an instance from an already loaded config
    pub fn with_config<P: AsRef<Path>>(config: SiteConfig, base_dir: P) -> Result<Self, Error> {
        let base_dir = absolute(base_dir.as_ref())?;
        let paths = config.resolve(&base_dir)?;
        let timezone = config.timezone()?;

        Ok(Self {
            config,
            base_dir,
            paths,
            timezone,
        })
    }

    /// List candidate content files
    pub fn discover(&self) -> Result<Vec<PathBuf>, Error> {
        if !self.paths.source.is_dir() {
            return Err(Error::SourceNotFound(self.paths.source.clone()));
        }
        Ok(discover(&self.paths))
    }

    /// Build the site content with the default Markdown renderer
    pub fn load(&self) -> Result<Build, Error> {
        let renderer = MarkdownRenderer::with_options(&self.config.highlight);
        let diagnostics = Diagnostics::new();
        let content = self.load_with(&renderer, &diagnostics)?;
        Ok(Build {
            content,
            diagnostics: diagnostics.into_sorted(),
        })
    }

    /// Build the site content with a custom renderer and diagnostics sink
    pub fn load_with(
        &self,
        renderer: &dyn DocumentRenderer,
        sink: &dyn DiagnosticSink,
    ) -> Result<SiteContent, Error> {
        let start = std::time::Instant::now();
        let files = self.discover()?;
        tracing::info!("Found {} content files in {:?}", files.len(), self.paths.source);

        let loader = ContentLoader::new(
            &self.paths,
            renderer,
            FrontMatterNormalizer::new(self.timezone),
        );
        let entries = loader
            .load_all(&files, self.config.worker_count(), sink)
            .map_err(Error::Workers)?;
        let content = SiteContent::assemble(entries, sink);

        tracing::info!("Loaded content in {:.2}s", start.elapsed().as_secs_f64());
        Ok(content)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(Error::WorkingDir)?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use content::DiagnosticKind;
    use regex::Regex;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(dir.path(), "_config.yml", "title: Test Site\njobs: 2\n");
        write(&source, "index.md", "---\ntitle: Home\n---\nWelcome");
        write(
            &source,
            "posts/2024-01-15-hello-world.md",
            "---\ntitle: Hello World\ndate: 2024-01-15 10:00:00\ntags: [rust, blog]\n---\nHello",
        );
        write(
            &source,
            "posts/2024-03-02-later.md",
            "---\ntitle: Later\ndate: 2024-03-02\n---\nLater",
        );
        write(&source, "posts/2023-12-31-no-date.md", "---\ntitle: Undated\n---\nOops");
        write(
            &source,
            "posts/2023-11-11-bad-date.md",
            "---\ndate: the other day\n---\nOops",
        );
        write(&source, "pages/about.md", "# About");
        write(&source, "pages/projects/index.md", "# Projects");
        write(&source, "pages/hidden.md", "---\npublished: false\n---\nHidden");
        write(&source, "drafts/new-idea.md", "---\npublished: false\n---\nIdea");
        write(&source, "misc/stray.md", "stray");
        write(&source, "_layouts/post.html", "<html></html>");
        write(&source, ".DS_Store.md", "junk");
        dir
    }

    #[test]
    fn test_full_run() {
        let dir = sample_site();
        let quire = Quire::new(dir.path()).unwrap();
        assert_eq!(quire.config.title, "Test Site");

        let build = quire.load().unwrap();
        let content = &build.content;

        let posts: Vec<_> = content.posts.iter().map(|p| p.permalink()).collect();
        assert_eq!(posts, vec!["/blog/later/", "/blog/hello-world/"]);

        let pages: Vec<_> = content.pages.iter().map(|p| p.permalink()).collect();
        assert_eq!(pages, vec!["/", "/about/", "/projects/"]);

        let drafts: Vec<_> = content.drafts.iter().map(|d| d.permalink()).collect();
        assert_eq!(drafts, vec!["/drafts/new-idea/"]);

        let kinds: Vec<_> = build.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::Unclassified,
                DiagnosticKind::Unpublished,
                DiagnosticKind::InvalidDate,
                DiagnosticKind::MissingDate,
                DiagnosticKind::MissingDate,
            ]
        );
    }

    #[test]
    fn test_collection_invariants() {
        let dir = sample_site();
        let build = Quire::new(dir.path()).unwrap().load().unwrap();
        let content = &build.content;
        let shape = Regex::new(r"^/([a-z0-9-]+/)*$").unwrap();

        for item in content.items() {
            assert!(shape.is_match(item.permalink()), "{}", item.permalink());
            assert!(item.output_path().starts_with(dir.path().join("public")));
        }
        assert!(content.posts.iter().all(|p| !p.is_draft()));
        assert!(content.posts.windows(2).all(|w| w[0].date() >= w[1].date()));
        assert!(content
            .pages
            .windows(2)
            .all(|w| w[0].permalink() <= w[1].permalink()));
        assert!(content.drafts.iter().all(|d| d.is_draft()));

        let mut ids: Vec<_> = content.items().map(|i| i.id()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_dropped_items_are_nowhere() {
        let dir = sample_site();
        let build = Quire::new(dir.path()).unwrap().load().unwrap();
        for id in [
            "pages/hidden.md",
            "posts/2023-12-31-no-date.md",
            "posts/2023-11-11-bad-date.md",
            "misc/stray.md",
        ] {
            assert!(build.content.find(id).is_none(), "{}", id);
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let dir = sample_site();
        let quire = Quire::new(dir.path()).unwrap();
        let first = quire.load().unwrap();
        let second = quire.load().unwrap();

        let ids = |b: &Build| b.content.items().map(|i| i.id().to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_custom_sink_and_renderer() {
        struct Plain;
        impl DocumentRenderer for Plain {
            fn render_document(&self, text: &str) -> anyhow::Result<content::RenderedDocument> {
                Ok(content::RenderedDocument {
                    front_matter: Default::default(),
                    raw: text.to_string(),
                    html: format!("<pre>{}</pre>", text),
                })
            }
        }

        let dir = TempDir::new().unwrap();
        write(&dir.path().join("source"), "pages/a.md", "# A");
        let quire = Quire::new(dir.path()).unwrap();
        let sink = Diagnostics::new();
        let content = quire.load_with(&Plain, &sink).unwrap();

        assert_eq!(content.pages.len(), 1);
        assert_eq!(content.pages[0].html_content(), "<pre># A</pre>");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fatal_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Quire::new(dir.path()).unwrap().load(),
            Err(Error::SourceNotFound(_))
        ));

        write(dir.path(), "_config.yml", "timezone: Nowhere/Special\n");
        assert!(matches!(
            Quire::new(dir.path()),
            Err(Error::Config(ConfigError::Timezone(_)))
        ));

        write(dir.path(), "_config.yml", "source_dir: ''\n");
        assert!(matches!(
            Quire::new(dir.path()),
            Err(Error::Config(ConfigError::MissingPath("source_dir")))
        ));
    }
}
