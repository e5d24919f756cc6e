//! Structured diagnostic messages with severity, codes, locations, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use fabric_common::TileCoord;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Each diagnostic carries a severity, a unique code, a message, the tile it
/// concerns (when there is one), and optional notes and help text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The tile where the issue was detected, if any.
    pub location: Option<TileCoord>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, code: DiagnosticCode, message: String) -> Self {
        Self {
            severity,
            code,
            message,
            location: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message.into())
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message.into())
    }

    /// Creates a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, code, message.into())
    }

    /// Attaches the tile this diagnostic is about.
    pub fn at(mut self, location: TileCoord) -> Self {
        self.location = Some(location);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let diag = Diagnostic::error(code, "snapshot unreadable");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "snapshot unreadable");
        assert!(diag.location.is_none());
    }

    #[test]
    fn create_warning_with_location() {
        let code = DiagnosticCode::new(Category::Device, 1);
        let diag = Diagnostic::warning(code, "connection leaves the grid").at(TileCoord::new(3, 4));
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.location, Some(TileCoord::new(3, 4)));
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Routing, 1);
        let diag = Diagnostic::warning(code, "routing did not converge")
            .with_note("12 resources still overused")
            .with_help("raise router.max_iterations");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Device, 3), "rehashed")
            .at(TileCoord::new(0, 1));
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, "rehashed");
        assert_eq!(back.location, Some(TileCoord::new(0, 1)));
    }
}
