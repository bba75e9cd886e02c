//! parseflow-lex - Lexical analysis.
//!
//! Transforms source text into a stream of [`Token`]s, each annotated with
//! the span it was read from. Statement separators (`\n`, `;`) are tokens;
//! spaces, tabs, and `#` comments are skipped. The stream always ends with
//! an `Eof` token, and the first lexical error aborts the stage.

pub mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Keyword, Token, TokenKind};

use std::sync::Arc;

use parseflow_util::{PfResult, SourceFile};

/// Lexes `file` into a token stream ending with `Eof`.
pub fn tokenize(file: &Arc<SourceFile>) -> PfResult<Vec<Token>> {
    Lexer::new(file).tokenize()
}
