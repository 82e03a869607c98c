//! Non-fatal diagnostics collected while building content

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Why a file was skipped or a field dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnsupportedExtension,
    ReadFailed,
    RenderFailed,
    InvalidDate,
    InvalidField,
    MissingDate,
    Unpublished,
    Unclassified,
    DuplicateId,
    PermalinkCollision,
}

impl DiagnosticKind {
    /// Whether the file was left out of the output entirely
    pub fn skips_item(self) -> bool {
        !matches!(
            self,
            DiagnosticKind::InvalidDate
                | DiagnosticKind::InvalidField
                | DiagnosticKind::PermalinkCollision
        )
    }
}

/// A single recoverable problem tied to a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: &Path, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Receives diagnostics from the build workers
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: logs every diagnostic and keeps it for the caller
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the collected diagnostics, ordered by path then kind
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut entries = self
            .entries
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
        entries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for Diagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_sorted_order() {
        let diagnostics = Diagnostics::new();
        diagnostics.emit(Diagnostic::new(
            Path::new("/s/b.md"),
            DiagnosticKind::MissingDate,
            "post has no valid `date`",
        ));
        diagnostics.emit(Diagnostic::new(
            Path::new("/s/a.md"),
            DiagnosticKind::Unpublished,
            "unpublished",
        ));
        diagnostics.emit(Diagnostic::new(
            Path::new("/s/a.md"),
            DiagnosticKind::InvalidDate,
            "bad date",
        ));

        assert_eq!(diagnostics.len(), 3);
        let sorted = diagnostics.into_sorted();
        let order: Vec<_> = sorted.iter().map(|d| (d.path.clone(), d.kind)).collect();
        assert_eq!(
            order,
            vec![
                (PathBuf::from("/s/a.md"), DiagnosticKind::InvalidDate),
                (PathBuf::from("/s/a.md"), DiagnosticKind::Unpublished),
                (PathBuf::from("/s/b.md"), DiagnosticKind::MissingDate),
            ]
        );
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(Path::new("/s/x.txt"), DiagnosticKind::UnsupportedExtension, "nope");
        assert_eq!(d.to_string(), "/s/x.txt: nope");
        assert!(d.kind.skips_item());
        assert!(!DiagnosticKind::InvalidDate.skips_item());
    }
}
