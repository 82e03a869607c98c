//! Create a new post, page or draft

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use std::fs;
use std::path::PathBuf;

use crate::content::permalink::slugify;
use crate::content::ItemType;
use crate::Quire;

/// Create a new source file and print its path
pub fn run(quire: &Quire, title: &str, layout: Option<&str>, path: Option<&str>) -> Result<()> {
    let layout = layout.unwrap_or(&quire.config.default_layout);
    let item_type: ItemType = layout.parse().map_err(anyhow::Error::msg)?;
    let file_path = create(quire, title, item_type, path, now(quire))?;
    println!("Created: {:?}", file_path);
    Ok(())
}

fn now(quire: &Quire) -> DateTime<FixedOffset> {
    match quire.timezone {
        Some(tz) => Utc::now().with_timezone(&tz).fixed_offset(),
        None => chrono::Local::now().fixed_offset(),
    }
}

/// Write the scaffolded file and return its path
pub fn create(
    quire: &Quire,
    title: &str,
    item_type: ItemType,
    path: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<PathBuf> {
    let slug = slugify(title);
    if slug.is_empty() && path.is_none() {
        anyhow::bail!("Title {:?} does not produce a usable file name", title);
    }

    let file_path = match (item_type, path) {
        (ItemType::Post, Some(p)) => quire.paths.posts.join(format!("{}.md", p)),
        (ItemType::Draft, Some(p)) => quire.paths.drafts.join(format!("{}.md", p)),
        (ItemType::Page, Some(p)) => quire.paths.pages.join(format!("{}.md", p)),
        (ItemType::Post, None) => {
            let post_name = &quire.config.new_post_name;
            let filename = post_name
                .replace(":title", &slug)
                .replace(":year", &now.format("%Y").to_string())
                .replace(":month", &now.format("%m").to_string())
                .replace(":day", &now.format("%d").to_string())
                .replace(":i_month", &now.format("%-m").to_string())
                .replace(":i_day", &now.format("%-d").to_string());
            quire.paths.posts.join(filename)
        }
        (ItemType::Draft, None) => quire.paths.drafts.join(format!("{}.md", slug)),
        (ItemType::Page, None) => quire.paths.pages.join(&slug).join("index.md"),
    };

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = scaffold(quire, title, item_type, now)?;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(&file_path, content)
        .with_context(|| format!("Failed to write {:?}", file_path))?;

    tracing::info!("Created new {} at {:?}", item_type, file_path);
    Ok(file_path)
}

/// File body from `scaffolds/<type>.md` when present, else a front-matter stub
fn scaffold(
    quire: &Quire,
    title: &str,
    item_type: ItemType,
    now: DateTime<FixedOffset>,
) -> Result<String> {
    let date = now.format("%Y-%m-%d %H:%M:%S").to_string();

    let scaffold_path = quire
        .base_dir
        .join("scaffolds")
        .join(format!("{}.md", item_type));
    if scaffold_path.is_file() {
        let template = fs::read_to_string(&scaffold_path)?;
        return Ok(template
            .replace("{{ title }}", title)
            .replace("{{ date }}", &date));
    }

    let mut front_matter: IndexMap<&str, serde_yaml::Value> = IndexMap::new();
    front_matter.insert("title", title.into());
    if item_type != ItemType::Draft {
        front_matter.insert("date", date.into());
    }
    if item_type != ItemType::Page {
        front_matter.insert("tags", serde_yaml::Value::Sequence(Vec::new()));
    }

    Ok(format!("---\n{}---\n", serde_yaml::to_string(&front_matter)?))
}
