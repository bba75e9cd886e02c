//! Diagnostic module - Error reporting infrastructure.
//!
//! Every failure the interpreter can surface to a user belongs to the closed
//! taxonomy in [`ErrorKind`]. A [`Diagnostic`] pairs the kind with a message,
//! the offending span, the file it occurred in, and (for runtime errors) the
//! call-frame trace, and renders to the stable user-facing format:
//!
//! ```text
//! RTError: Division by zero
//! File <stdin>, line 1, in <program>
//!
//! 1 / 0
//! ^^^^^
//! ```

mod snippet;

pub use snippet::render_snippet;

use std::fmt;
use std::sync::Arc;

use crate::span::{SourceFile, Span};

/// Diagnostic category.
///
/// The `Display` form is the error name used in the rendered header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Unknown character encountered by the lexer.
    #[error("IllegalCharError")]
    IllegalChar,

    /// The lexer expected a specific next character.
    #[error("ExpectedCharError")]
    ExpectedChar,

    /// The parser could not match the grammar.
    #[error("InvalidSyntaxError")]
    InvalidSyntax,

    /// Any failure raised during evaluation.
    #[error("RTError")]
    Runtime,
}

/// One call frame of a runtime error trace.
///
/// `span` is where execution entered the frame: the error site for the
/// innermost frame, the call site recorded on the callee context for every
/// outer frame.
#[derive(Clone, Debug)]
pub struct TraceFrame {
    /// Display name of the executing context (`<program>`, function name).
    pub display_name: String,
    /// File the frame's span points into.
    pub file: Arc<SourceFile>,
    /// Entry location of the frame.
    pub span: Span,
}

/// A user-visible error with its source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Error category.
    pub kind: ErrorKind,
    /// Details shown after the error name.
    pub message: String,
    /// Offending source region.
    pub span: Span,
    /// File the span points into.
    pub file: Arc<SourceFile>,
    /// Call frames, innermost first. Empty for lex/parse errors.
    pub trace: Vec<TraceFrame>,
}

impl Diagnostic {
    /// Create a diagnostic with no trace.
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        span: Span,
        file: Arc<SourceFile>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            file,
            trace: Vec::new(),
        }
    }

    /// Unknown character in the lexer.
    pub fn illegal_char(ch: char, span: Span, file: Arc<SourceFile>) -> Self {
        Self::new(ErrorKind::IllegalChar, format!("'{ch}'"), span, file)
    }

    /// Lexer expected a specific character.
    pub fn expected_char(details: impl Into<String>, span: Span, file: Arc<SourceFile>) -> Self {
        Self::new(ErrorKind::ExpectedChar, details, span, file)
    }

    /// Parser error naming the expected construct.
    pub fn invalid_syntax(details: impl Into<String>, span: Span, file: Arc<SourceFile>) -> Self {
        Self::new(ErrorKind::InvalidSyntax, details, span, file)
    }

    /// Runtime failure.
    pub fn runtime(message: impl Into<String>, span: Span, file: Arc<SourceFile>) -> Self {
        Self::new(ErrorKind::Runtime, message, span, file)
    }

    /// Attach the call-frame trace, innermost first.
    pub fn with_trace(mut self, trace: Vec<TraceFrame>) -> Self {
        self.trace = trace;
        self
    }

    /// Render the diagnostic to its user-facing form.
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}\n", self.kind, self.message);

        if self.trace.is_empty() {
            out.push_str(&format!(
                "File {}, line {}\n",
                self.file.name(),
                self.span.start.line + 1
            ));
        } else {
            // Outermost frame first, error site last.
            for frame in self.trace.iter().rev() {
                out.push_str(&format!(
                    "File {}, line {}, in {}\n",
                    frame.file.name(),
                    frame.span.start.line + 1,
                    frame.display_name
                ));
            }
        }

        out.push('\n');
        out.push_str(&render_snippet(&self.file, self.span));
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for Diagnostic {}
