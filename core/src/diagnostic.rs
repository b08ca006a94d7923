//! Append-only diagnostic collection and the source-line-plus-caret
//! renderer used to print them.

use std::fmt::Write as _;

use crate::source::Source;
use crate::span::Span;

/// A single `(span, message)` diagnostic produced during tokenizing or
/// parsing. The message is fully formatted text, not a format string —
/// callers substitute arguments before pushing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// An append-only list of diagnostics. Tokenizing keeps scanning after
/// pushing an error; parsing stops at the first one (see `qak::parser`).
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(span, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Renders every diagnostic as
    /// `Error (<file>:<line>): <message>` followed by the offending source
    /// line and a caret row underneath it — tabs under tabs, spaces under
    /// spaces, so indentation lines up regardless of the line's mix of the
    /// two.
    pub fn render(&self, source: &Source) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            render_one(&mut out, source, diagnostic);
        }
        out
    }
}

fn render_one(out: &mut String, source: &Source, diagnostic: &Diagnostic) {
    let line = source.line(diagnostic.span.start_line);
    let _ = writeln!(
        out,
        "Error ({}:{}): {}",
        source.file_name(),
        line.line_number,
        diagnostic.message
    );

    if line.is_empty() {
        out.push('\n');
        return;
    }

    let text = source.text(Span::new(line.start, line.line_number, line.end, line.line_number));
    let _ = writeln!(out, "{text}");

    let line_len = line.len() as i64;
    let raw_start = diagnostic.span.start as i64 - line.start as i64;
    let error_start = raw_start.clamp(0, line_len.max(1) - 1);
    let error_end = if diagnostic.span.is_empty() {
        error_start
    } else {
        (diagnostic.span.end as i64 - 1 - line.start as i64).clamp(error_start, line_len - 1)
    };

    let bytes = source.slice(Span::new(line.start, 0, line.end, 0));
    for (i, &byte) in bytes.iter().enumerate() {
        let i = i as i64;
        if i >= error_start && i <= error_end {
            out.push('^');
        } else if byte == b'\t' {
            out.push('\t');
        } else {
            out.push(' ');
        }
    }
    out.push('\n');
}
