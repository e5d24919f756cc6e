//! Structured diagnostics for device construction and routing.
//!
//! This crate provides [`Diagnostic`] messages with severity levels, coded
//! identifiers, an optional tile location, and notes. The thread-safe
//! [`DiagnosticSink`] accumulates diagnostics while a device is built or nets
//! are routed, and [`TerminalRenderer`] formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
