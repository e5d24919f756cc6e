//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[D001]: connection from wire 14 targets a tile outside the device
///   --> tile (3, 7)
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes for the header.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let head = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return head;
        }
        let color = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{color}m{head}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);
        if let Some(location) = diag.location {
            out.push_str(&format!("  --> tile {location}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use fabric_common::TileCoord;

    #[test]
    fn render_plain_header() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Routing, 1), "not converged");
        let out = TerminalRenderer::new(false).render(&diag);
        assert_eq!(out, "warning[R001]: not converged\n");
    }

    #[test]
    fn render_location_and_notes() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Device, 1), "dropped")
            .at(TileCoord::new(3, 7))
            .with_note("target (3, 9) does not exist")
            .with_help("check the device dimensions");
        let out = TerminalRenderer::new(false).render(&diag);
        assert!(out.contains("  --> tile (3, 7)\n"));
        assert!(out.contains("   = note: target (3, 9) does not exist\n"));
        assert!(out.contains("   = help: check the device dimensions\n"));
    }

    #[test]
    fn render_color_wraps_header() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), "boom");
        let out = TerminalRenderer::new(true).render(&diag);
        assert!(out.starts_with("\x1b[1;31merror[E001]\x1b[0m: boom"));
    }
}
