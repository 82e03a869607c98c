//! Front-matter normalization
//!
//! Coerces the recognized keys of a freshly parsed [`FrontMatter`] into their
//! canonical types: `date` becomes a date value (or is dropped), `tags` and
//! `categories` become lists of text. Other keys are left alone.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use std::path::Path;

use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::frontmatter::{FieldValue, FrontMatter};

/// Date-time layouts accepted for the `date` field, besides RFC 3339
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const LIST_KEYS: [&str; 2] = ["tags", "categories"];

/// Normalizes front-matter; dates without an offset are read in `timezone`
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterNormalizer {
    timezone: Option<Tz>,
}

impl FrontMatterNormalizer {
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }

    /// Normalize `front_matter` read from `source`, reporting dropped fields to `sink`
    pub fn normalize(
        &self,
        mut front_matter: FrontMatter,
        source: &Path,
        sink: &dyn DiagnosticSink,
    ) -> FrontMatter {
        // Replacing through `insert` keeps each key at its original position
        if let Some(value) = front_matter.get("date").cloned() {
            match self.coerce_date(&value) {
                Ok(Some(date)) => {
                    front_matter.insert("date", FieldValue::Date(date));
                }
                Ok(None) => {
                    front_matter.remove("date");
                }
                Err(()) => {
                    front_matter.remove("date");
                    sink.emit(Diagnostic::new(
                        source,
                        DiagnosticKind::InvalidDate,
                        format!("Invalid date `{}`, field ignored", value),
                    ));
                }
            }
        }

        for key in LIST_KEYS {
            let Some(value) = front_matter.get(key).cloned() else {
                continue;
            };
            match coerce_list(value) {
                Ok(Some(list)) => {
                    front_matter.insert(key, list);
                }
                Ok(None) => {
                    front_matter.remove(key);
                }
                Err(value) => {
                    front_matter.remove(key);
                    sink.emit(Diagnostic::new(
                        source,
                        DiagnosticKind::InvalidField,
                        format!("`{}` must be text or a list, got {}", key, value),
                    ));
                }
            }
        }

        front_matter
    }

    /// `Ok(None)` for an explicit null, `Err` when the value is not a date
    fn coerce_date(&self, value: &FieldValue) -> Result<Option<DateTime<FixedOffset>>, ()> {
        match value {
            FieldValue::Null => Ok(None),
            FieldValue::Date(date) => Ok(Some(*date)),
            FieldValue::Text(_)
            | FieldValue::Integer(_)
            | FieldValue::Unsigned(_)
            | FieldValue::Number(_) => value
                .scalar_text()
                .and_then(|s| parse_date(&s, self.timezone))
                .map(Some)
                .ok_or(()),
            _ => Err(()),
        }
    }
}

/// `Ok(None)` when the key should stay absent, `Err` for unusable values
fn coerce_list(value: FieldValue) -> Result<Option<FieldValue>, FieldValue> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::List(items) => {
            let mut texts = Vec::with_capacity(items.len());
            flatten_texts(items, &mut texts);
            Ok(Some(FieldValue::List(texts)))
        }
        FieldValue::Map(_) => Err(value),
        scalar => Ok(scalar.scalar_text().map(|s| FieldValue::List(vec![FieldValue::Text(s)]))),
    }
}

/// Stringify list elements; nested lists (hierarchical categories) are flattened
fn flatten_texts(items: Vec<FieldValue>, out: &mut Vec<FieldValue>) {
    for item in items {
        match item {
            FieldValue::List(nested) => flatten_texts(nested, out),
            other => {
                if let Some(text) = other.scalar_text() {
                    out.push(FieldValue::Text(text));
                }
            }
        }
    }
}

/// Parse a date string in various formats
pub fn parse_date(s: &str, timezone: Option<Tz>) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    match timezone {
        Some(tz) => in_timezone(&naive, tz),
        None => Some(Utc.from_utc_datetime(&naive).fixed_offset()),
    }
}

/// Attach `tz` to a wall-clock time
///
/// Ambiguous times take the earlier instant. Times skipped by a DST jump
/// keep their wall clock at the offset in effect just before the jump.
fn in_timezone(naive: &NaiveDateTime, tz: Tz) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
        LocalResult::None => {
            let before = *naive - Duration::hours(3);
            let offset = tz.offset_from_local_datetime(&before).earliest()?.fix();
            offset.from_local_datetime(naive).single()
        }
    }
}
