//! String literal lexing.

use std::sync::Arc;

use parseflow_util::{Diagnostic, PfResult};

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a `"`-delimited string literal.
    ///
    /// Escape sequences `\n`, `\t`, `\\` and `\"` are processed; any other
    /// escaped character stands for itself. Reaching end of input before the
    /// closing quote is an `ExpectedCharError`.
    pub(crate) fn lex_string(&mut self) -> PfResult<Token> {
        self.cursor.advance();

        let mut content = String::new();

        loop {
            if self.cursor.is_at_end() {
                return Err(Diagnostic::expected_char(
                    "'\"' (to close string)",
                    self.token_span(),
                    Arc::clone(&self.file),
                ));
            }

            let c = self.cursor.current_char();

            if c == '"' {
                self.cursor.advance();
                break;
            }

            if c == '\\' {
                self.cursor.advance();
                let escaped = self.cursor.current_char();
                self.cursor.advance();
                content.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }

        Ok(self.make(TokenKind::Str(content)))
    }
}
