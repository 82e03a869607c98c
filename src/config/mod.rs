//! Configuration module

mod site;

pub use site::ConfigError;
pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::SitePaths;
pub use site::CONFIG_FILES;
