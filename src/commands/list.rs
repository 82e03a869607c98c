//! List site content

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::content::{Diagnostic, SiteContent};
use crate::Quire;

/// List site content by type
pub fn run(quire: &Quire, content_type: &str, json: bool) -> Result<()> {
    let build = quire.load()?;
    print!("{}", render(&build.content, content_type, json)?);
    report(&build.diagnostics);
    Ok(())
}

/// Print a one-line diagnostics summary to stderr
pub(crate) fn report(diagnostics: &[Diagnostic]) {
    if let Some(line) = summary(diagnostics) {
        eprintln!("{}", line);
    }
}

/// Count dropped files apart from items that were only adjusted
fn summary(diagnostics: &[Diagnostic]) -> Option<String> {
    if diagnostics.is_empty() {
        return None;
    }
    let skipped = diagnostics.iter().filter(|d| d.kind.skips_item()).count();
    let adjusted = diagnostics.len() - skipped;
    Some(format!(
        "{} skipped, {} adjusted, run with --debug for details",
        skipped, adjusted
    ))
}

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    title: &'a str,
    permalink: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Serialize)]
struct Count<'a> {
    name: &'a str,
    count: usize,
}

/// Format one listing as text or JSON
pub fn render(content: &SiteContent, content_type: &str, json: bool) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let rows: Vec<Row> = content
                .posts
                .iter()
                .map(|post| Row {
                    id: post.id(),
                    title: post.title(),
                    permalink: post.permalink(),
                    date: Some(post.date().format("%Y-%m-%d").to_string()),
                })
                .collect();
            write_rows(&mut out, "Posts", &rows, json)?;
        }
        "page" | "pages" => {
            let rows: Vec<Row> = content
                .pages
                .iter()
                .map(|page| Row {
                    id: page.id(),
                    title: page.title(),
                    permalink: page.permalink(),
                    date: None,
                })
                .collect();
            write_rows(&mut out, "Pages", &rows, json)?;
        }
        "draft" | "drafts" => {
            let rows: Vec<Row> = content
                .drafts
                .iter()
                .map(|draft| Row {
                    id: draft.id(),
                    title: draft.title(),
                    permalink: draft.permalink(),
                    date: draft.date().map(|d| d.format("%Y-%m-%d").to_string()),
                })
                .collect();
            write_rows(&mut out, "Drafts", &rows, json)?;
        }
        "tag" | "tags" => write_counts(&mut out, "Tags", &content.tags(), json)?,
        "category" | "categories" => {
            write_counts(&mut out, "Categories", &content.categories(), json)?
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, draft, tag, category",
                content_type
            );
        }
    }

    Ok(out)
}

fn write_rows(out: &mut String, heading: &str, rows: &[Row], json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(rows)?)?;
        return Ok(());
    }

    writeln!(out, "{} ({}):", heading, rows.len())?;
    for row in rows {
        match &row.date {
            Some(date) => writeln!(out, "  {} - {} [{}]", date, row.title, row.id)?,
            None => writeln!(out, "  {} [{}]", row.title, row.id)?,
        }
    }
    Ok(())
}

fn write_counts(
    out: &mut String,
    heading: &str,
    counts: &BTreeMap<String, usize>,
    json: bool,
) -> Result<()> {
    // Most used first, then by name
    let mut rows: Vec<Count> = counts
        .iter()
        .map(|(name, count)| Count {
            name,
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(b.name)));

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    writeln!(out, "{} ({}):", heading, rows.len())?;
    for row in rows {
        writeln!(out, "  {} ({})", row.name, row.count)?;
    }
    Ok(())
}
