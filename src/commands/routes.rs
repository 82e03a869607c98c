//! Show the permalink to output file table

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::content::SiteContent;
use crate::Quire;

#[derive(Serialize)]
struct Route<'a> {
    permalink: &'a str,
    output: String,
    id: &'a str,
    draft: bool,
}

/// Print every route of the site
pub fn run(quire: &Quire, json: bool) -> Result<()> {
    let build = quire.load()?;
    print!("{}", render(&build.content, &quire.paths.public, json)?);
    super::list::report(&build.diagnostics);
    Ok(())
}

/// Format the route table; output paths are shown relative to `public`
pub fn render(content: &SiteContent, public: &Path, json: bool) -> Result<String> {
    let mut routes: Vec<Route> = content
        .items()
        .map(|item| Route {
            permalink: item.permalink(),
            output: item
                .output_path()
                .strip_prefix(public)
                .unwrap_or(item.output_path())
                .to_string_lossy()
                .replace('\\', "/"),
            id: item.id(),
            draft: item.is_draft(),
        })
        .collect();
    routes.sort_by(|a, b| a.permalink.as_bytes().cmp(b.permalink.as_bytes()));

    let mut out = String::new();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&routes)?)?;
        return Ok(out);
    }

    let width = routes.iter().map(|r| r.permalink.len()).max().unwrap_or(0);
    writeln!(out, "Routes ({}):", routes.len())?;
    for route in &routes {
        let marker = if route.draft { " (draft)" } else { "" };
        writeln!(
            out,
            "  {:width$}  {}{}",
            route.permalink,
            route.output,
            marker,
            width = width
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_routes_table() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        for (relative, body) in [
            ("index.md", "home"),
            ("pages/about.md", "about"),
            ("posts/2024-01-15-hello.md", "---\ndate: 2024-01-15\n---\nhi"),
            ("drafts/idea.md", "idea"),
        ] {
            let path = source.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }

        let quire = Quire::new(dir.path()).unwrap();
        let build = quire.load().unwrap();
        let out = render(&build.content, &quire.paths.public, false).unwrap();

        assert_eq!(
            out,
            "Routes (4):\n\
             \x20 /              index.html\n\
             \x20 /about/        about/index.html\n\
             \x20 /blog/hello/   blog/hello/index.html\n\
             \x20 /drafts/idea/  drafts/idea/index.html (draft)\n"
        );

        let json = render(&build.content, &quire.paths.public, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[3]["draft"], true);
    }
}
