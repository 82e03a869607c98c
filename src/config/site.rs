//! Site configuration (_config.yml / _config.toml)

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file names probed in the site base directory, in priority order
pub const CONFIG_FILES: [&str; 3] = ["_config.yml", "_config.yaml", "_config.toml"];

/// Fatal configuration errors. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to merge config with defaults: {0}")]
    Merge(String),

    #[error("Required directory `{0}` is not set")]
    MissingPath(&'static str),

    #[error("Directory `{field}` does not resolve to an absolute path: {path:?}")]
    NotAbsolute { field: &'static str, path: PathBuf },

    #[error("Unknown timezone: {0}")]
    Timezone(String),
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Directory
    pub source_dir: String,
    pub posts_dir: String,
    pub pages_dir: String,
    pub drafts_dir: String,
    pub layouts_dir: String,
    pub includes_dir: String,
    pub assets_dir: String,
    pub public_dir: String,

    // Writing
    pub new_post_name: String,
    pub default_layout: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Worker threads used to build content items (0 = automatic)
    pub jobs: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quire".to_string(),
            description: String::new(),
            author: String::new(),
            timezone: String::new(),

            url: "http://example.com".to_string(),

            source_dir: "source".to_string(),
            posts_dir: "posts".to_string(),
            pages_dir: "pages".to_string(),
            drafts_dir: "drafts".to_string(),
            layouts_dir: "_layouts".to_string(),
            includes_dir: "_includes".to_string(),
            assets_dir: "assets".to_string(),
            public_dir: "public".to_string(),

            new_post_name: ":year-:month-:day-:title.md".to_string(),
            default_layout: "post".to_string(),
            highlight: HighlightConfig::default(),

            jobs: 0,
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file, merging user values over the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
        let user = if is_toml {
            parse_toml(&content)
        } else {
            serde_yaml::from_str::<serde_yaml::Value>(&content).map_err(|e| e.to_string())
        }
        .map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        let config = Self::merge_over_defaults(user).map_err(|e| match e {
            MergeFailure::NotAMapping => ConfigError::Parse {
                path: path.to_path_buf(),
                message: "top level must be a mapping".to_string(),
            },
            MergeFailure::Invalid(message) => ConfigError::Merge(message),
        })?;

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load the first config file found in `base_dir`, or the defaults when there is none
    pub fn load_from_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self, ConfigError> {
        let base_dir = base_dir.as_ref();
        match CONFIG_FILES
            .iter()
            .map(|name| base_dir.join(name))
            .find(|p| p.is_file())
        {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No config file in {:?}, using defaults", base_dir);
                Ok(Self::default())
            }
        }
    }

    fn merge_over_defaults(user: serde_yaml::Value) -> Result<Self, MergeFailure> {
        let user = match user {
            serde_yaml::Value::Null => return Ok(Self::default()),
            serde_yaml::Value::Mapping(map) => map,
            _ => return Err(MergeFailure::NotAMapping),
        };

        let mut merged = serde_yaml::to_value(Self::default())
            .map_err(|e| MergeFailure::Invalid(e.to_string()))?;
        if let serde_yaml::Value::Mapping(base) = &mut merged {
            merge_mapping(base, user);
        }

        serde_yaml::from_value(merged).map_err(|e| MergeFailure::Invalid(e.to_string()))
    }

    /// Resolve configured directories against the site base directory
    ///
    /// `source_dir` and `public_dir` are relative to `base_dir`; the content
    /// directories are relative to the source directory. Absolute values are
    /// kept as they are.
    pub fn resolve(&self, base_dir: &Path) -> Result<SitePaths, ConfigError> {
        let source = resolve_dir("source_dir", &self.source_dir, base_dir)?;
        let paths = SitePaths {
            posts: resolve_dir("posts_dir", &self.posts_dir, &source)?,
            pages: resolve_dir("pages_dir", &self.pages_dir, &source)?,
            drafts: resolve_dir("drafts_dir", &self.drafts_dir, &source)?,
            layouts: resolve_dir("layouts_dir", &self.layouts_dir, &source)?,
            includes: resolve_dir("includes_dir", &self.includes_dir, &source)?,
            assets: resolve_dir("assets_dir", &self.assets_dir, &source)?,
            public: resolve_dir("public_dir", &self.public_dir, base_dir)?,
            source,
        };
        Ok(paths)
    }

    /// Parse the configured timezone; an empty value means UTC
    pub fn timezone(&self) -> Result<Option<Tz>, ConfigError> {
        let name = self.timezone.trim();
        if name.is_empty() {
            return Ok(None);
        }
        name.parse::<Tz>()
            .map(Some)
            .map_err(|_| ConfigError::Timezone(name.to_string()))
    }

    /// Worker count for the build pool
    pub fn worker_count(&self) -> usize {
        if self.jobs > 0 {
            return self.jobs;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(16)
    }
}

enum MergeFailure {
    NotAMapping,
    Invalid(String),
}

fn parse_toml(content: &str) -> Result<serde_yaml::Value, String> {
    let value: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
    serde_yaml::to_value(value).map_err(|e| e.to_string())
}

/// Recursively overlay `user` onto `base`; nested mappings merge key by key
fn merge_mapping(base: &mut serde_yaml::Mapping, user: serde_yaml::Mapping) {
    for (key, value) in user {
        match (base.get_mut(&key), value) {
            (Some(serde_yaml::Value::Mapping(existing)), serde_yaml::Value::Mapping(incoming)) => {
                merge_mapping(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn resolve_dir(field: &'static str, value: &str, parent: &Path) -> Result<PathBuf, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingPath(field));
    }
    let path = parent.join(value);
    if !path.is_absolute() {
        return Err(ConfigError::NotAbsolute { field, path });
    }
    Ok(path)
}

/// Absolute directory roots resolved from [`SiteConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitePaths {
    pub source: PathBuf,
    pub posts: PathBuf,
    pub pages: PathBuf,
    pub drafts: PathBuf,
    pub layouts: PathBuf,
    pub includes: PathBuf,
    pub assets: PathBuf,
    pub public: PathBuf,
}

impl SitePaths {
    /// Final component of the pages root, removed from page permalinks
    pub fn pages_dir_name(&self) -> &str {
        self.pages
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Directories that hold content items
    pub fn content_roots(&self) -> [&Path; 4] {
        [
            self.source.as_path(),
            self.posts.as_path(),
            self.pages.as_path(),
            self.drafts.as_path(),
        ]
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
