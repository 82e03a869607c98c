//! Clean the public directory

use anyhow::{Context, Result};
use std::fs;

use crate::Quire;

/// Remove the public directory; returns whether anything was deleted
pub fn run(quire: &Quire) -> Result<bool> {
    let public = &quire.paths.public;
    if !public.exists() {
        tracing::debug!("Nothing to clean at {:?}", public);
        return Ok(false);
    }
    if *public == quire.base_dir || quire.paths.source.starts_with(public) {
        anyhow::bail!("Refusing to delete {:?}: it contains the site sources", public);
    }

    fs::remove_dir_all(public).with_context(|| format!("Failed to delete {:?}", public))?;
    tracing::info!("Deleted: {:?}", public);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_public() {
        let dir = TempDir::new().unwrap();
        let quire = Quire::new(dir.path()).unwrap();
        fs::create_dir_all(quire.paths.public.join("blog")).unwrap();
        fs::write(quire.paths.public.join("index.html"), "x").unwrap();

        assert!(run(&quire).unwrap());
        assert!(!quire.paths.public.exists());
        assert!(!run(&quire).unwrap());
    }

    #[test]
    fn test_clean_keeps_sources() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig {
            public_dir: ".".to_string(),
            ..Default::default()
        };
        let quire = Quire::with_config(config, dir.path()).unwrap();
        fs::create_dir_all(&quire.paths.source).unwrap();

        assert!(run(&quire).is_err());
        assert!(quire.paths.source.exists());
    }
}
