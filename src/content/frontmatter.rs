//! Front-matter parsing

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
    Number(f64),
    Text(String),
    Date(DateTime<FixedOffset>),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text form of a scalar; `None` for null, lists and maps
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Unsigned(n) => Some(n.to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Date(d) => Some(d.to_rfc3339()),
            FieldValue::Null | FieldValue::List(_) | FieldValue::Map(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            FieldValue::Map(map) => write!(f, "{{{} keys}}", map.len()),
            scalar => f.write_str(&scalar.scalar_text().unwrap_or_default()),
        }
    }
}

impl From<serde_yaml::Value> for FieldValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => number(n.as_i64(), n.as_u64(), n.as_f64()),
            Value::String(s) => FieldValue::Text(s),
            Value::Sequence(seq) => FieldValue::List(seq.into_iter().map(Into::into).collect()),
            Value::Mapping(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), FieldValue::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => FieldValue::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => number(n.as_i64(), n.as_u64(), n.as_f64()),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                FieldValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Keep integers exact; only non-integral values become `f64`
fn number(int: Option<i64>, unsigned: Option<u64>, float: Option<f64>) -> FieldValue {
    match (int, unsigned, float) {
        (Some(n), _, _) => FieldValue::Integer(n),
        (None, Some(n), _) => FieldValue::Unsigned(n),
        (None, None, Some(n)) => FieldValue::Number(n),
        (None, None, None) => FieldValue::Null,
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => FieldValue::from(other).to_string(),
    }
}

/// Front-matter data from a post or page
///
/// An ordered open mapping. Only the recognized keys (`layout`, `title`,
/// `date`, `tags`, `categories`, `published`, `slug`) are given meaning by
/// the pipeline; anything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter {
    fields: IndexMap<String, FieldValue>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(key.into(), value)
    }

    /// Remove a key, keeping the order of the remaining fields
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn layout(&self) -> Option<&str> {
        self.text("layout")
    }

    /// Non-blank `slug` value; numbers and other scalars are read as text
    pub fn slug(&self) -> Option<String> {
        self.get("slug")
            .and_then(FieldValue::scalar_text)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn published(&self) -> Option<bool> {
        self.flag("published")
    }

    /// The `date` field, once normalized to a date value
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.get("date").and_then(FieldValue::as_date).copied()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.strings("tags")
    }

    pub fn categories(&self) -> Vec<&str> {
        self.strings("categories")
    }

    fn strings(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .and_then(FieldValue::as_list)
            .map(|items| items.iter().filter_map(FieldValue::as_str).collect())
            .unwrap_or_default()
    }

    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start();

        // YAML front-matter (---)
        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        // JSON front-matter (;;; or {"key":)
        if content.starts_with(";;;") || content.starts_with('{') {
            return Self::parse_json(content);
        }

        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let rest = &content[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        let Some(end_pos) = rest.find("\n---") else {
            // No closing ---, treat as no front-matter
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..];
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A `---` thematic break followed by prose is not front-matter
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)
            .map_err(|e| anyhow!("Failed to parse YAML front-matter: {}", e))?;
        Ok((Self::from_value(value.into())?, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        // JSON front-matter ends with ;;;
        if let Some(rest) = content.strip_prefix(";;;") {
            if let Some(end_pos) = rest.find(";;;") {
                let json_content = rest[..end_pos].trim();
                let remaining = &rest[end_pos + 3..];
                let remaining = remaining.trim_start_matches(['\n', '\r']);

                // The `;;;` form allows the surrounding braces to be omitted
                let json_content = if json_content.starts_with('{') {
                    json_content.to_string()
                } else {
                    format!("{{{}}}", json_content)
                };
                return Ok((Self::from_json(&json_content)?, remaining));
            }
        }

        // A JSON object at the start, up to its matching brace. Anything that
        // is not valid JSON (a `{{< shortcode >}}`, say) is body text.
        if content.starts_with('{') {
            let parsed = matching_brace(content).and_then(|end_pos| {
                let fields = Self::from_json(&content[..end_pos]).ok()?;
                Some((fields, content[end_pos..].trim_start_matches(['\n', '\r'])))
            });
            return Ok(parsed.unwrap_or_else(|| (FrontMatter::default(), content)));
        }

        Err(anyhow!("Invalid JSON front-matter"))
    }

    fn from_json(json_content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json_content)
            .map_err(|e| anyhow!("Failed to parse JSON front-matter: {}", e))?;
        Self::from_value(value.into())
    }

    fn from_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Map(fields) => Ok(Self { fields }),
            FieldValue::Null => Ok(Self::default()),
            _ => Err(anyhow!("Front-matter must be a key/value mapping")),
        }
    }
}

impl FromIterator<(String, FieldValue)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Valid YAML front-matter has at least one `key: value` line whose key is a
/// simple identifier (and not a URL scheme)
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Byte offset just past the brace closing the object opened at index 0
fn matching_brace(content: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in content.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
  - blog
categories:
  - programming
custom:
  nested: true
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("Hello World"));
        assert_eq!(
            fm.get("date"),
            Some(&FieldValue::Text("2024-01-15 10:30:00".to_string()))
        );
        assert_eq!(fm.tags(), vec!["rust", "blog"]);
        assert_eq!(fm.categories(), vec!["programming"]);
        assert!(matches!(fm.get("custom"), Some(FieldValue::Map(_))));
        assert!(remaining.contains("This is the content."));
    }

    #[test]
    fn test_preserves_key_order() {
        let content = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<_> = fm.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#"{"title": "Test {braces}", "tags": ["a", "b"], "published": false}

This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("Test {braces}"));
        assert_eq!(fm.published(), Some(false));
        assert!(remaining.contains("This is content."));
        assert!(!remaining.contains("published"));
    }

    #[test]
    fn test_parse_semicolon_json_frontmatter() {
        let content = ";;;\n\"title\": \"Semi\",\n\"slug\": \"custom\"\n;;;\nBody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("Semi"));
        assert_eq!(fm.slug().as_deref(), Some("custom"));
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just a heading\n").unwrap();
        assert!(fm.is_empty());
        assert_eq!(remaining, "# Just a heading\n");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_scalar_yaml_is_an_error() {
        let content = "---\n|\n  title: folded\n---\nbody";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

-- 2025-11-09

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), None);
        assert!(remaining.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = r#"
---

Check out https://example.com/path and http://test.com

---
More content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_brace_body_is_not_front_matter() {
        let content = "{{< youtube id=\"abc\" >}}\n\nSome text.\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(remaining, content);

        let (fm, remaining) = FrontMatter::parse("{ not json }\nbody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(remaining, "{ not json }\nbody");
    }

    #[test]
    fn test_unterminated_semicolon_block_is_an_error() {
        assert!(FrontMatter::parse(";;;\n\"title\": \"x\"\nbody").is_err());
    }

    #[test]
    fn test_integers_stay_exact() {
        let content = "---\nref: 9007199254740993\nbig: 18446744073709551615\nneg: -3\nratio: 0.5\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.get("ref"), Some(&FieldValue::Integer(9007199254740993)));
        assert_eq!(fm.get("big"), Some(&FieldValue::Unsigned(u64::MAX)));
        assert_eq!(fm.get("neg"), Some(&FieldValue::Integer(-3)));
        assert_eq!(fm.get("ratio"), Some(&FieldValue::Number(0.5)));

        let json = serde_json::to_string(&fm).unwrap();
        assert!(json.contains("\"ref\":9007199254740993"), "{}", json);
        assert!(json.contains("\"big\":18446744073709551615"), "{}", json);

        let (fm, _) = FrontMatter::parse("{\"id\": 9007199254740993}\nbody").unwrap();
        assert_eq!(fm.get("id"), Some(&FieldValue::Integer(9007199254740993)));
    }

    #[test]
    fn test_numeric_slug_is_text() {
        let (fm, _) = FrontMatter::parse("---\nslug: 404\n---\nbody").unwrap();
        assert_eq!(fm.slug().as_deref(), Some("404"));
    }

    #[test]
    fn test_slug_ignores_blank() {
        let fm: FrontMatter = [("slug".to_string(), FieldValue::Text("  ".to_string()))]
            .into_iter()
            .collect();
        assert_eq!(fm.slug(), None);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut fm: FrontMatter = ["a", "b", "c"]
            .into_iter()
            .map(|k| (k.to_string(), FieldValue::Bool(true)))
            .collect();
        fm.remove("a");
        let keys: Vec<_> = fm.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }
}
