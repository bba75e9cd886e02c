//! Number literal lexing.

use std::sync::Arc;

use parseflow_util::{Diagnostic, PfResult};

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a number literal.
    ///
    /// A greedy digit run with at most one `.`: no dot produces
    /// `TokenKind::Int`, a dot produces `TokenKind::Float`. Both live on the
    /// unified `f64` number model.
    pub(crate) fn lex_number(&mut self) -> PfResult<Token> {
        let start = self.cursor.pos();
        let mut is_float = false;

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                self.cursor.advance();
            } else if c == '.' && !is_float {
                is_float = true;
                self.cursor.advance();
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(start);
        let value = match text.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                return Err(Diagnostic::expected_char(
                    "digit",
                    self.token_span(),
                    Arc::clone(&self.file),
                ))
            }
        };

        Ok(self.make(if is_float {
            TokenKind::Float(value)
        } else {
            TokenKind::Int(value)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parseflow_util::SourceFile;

    fn lex_num(source: &str) -> TokenKind {
        let file = Arc::new(SourceFile::new("<test>", source));
        let mut lexer = Lexer::new(&file);
        lexer.next_token().expect("lexes cleanly").kind
    }

    #[test]
    fn test_integer() {
        assert_eq!(lex_num("0"), TokenKind::Int(0.0));
        assert_eq!(lex_num("42"), TokenKind::Int(42.0));
        assert_eq!(lex_num("123456"), TokenKind::Int(123456.0));
    }

    #[test]
    fn test_float() {
        assert_eq!(lex_num("3.14"), TokenKind::Float(3.14));
        assert_eq!(lex_num("0.5"), TokenKind::Float(0.5));
    }

    #[test]
    fn test_second_dot_ends_the_literal() {
        let file = Arc::new(SourceFile::new("<test>", "1.2.3"));
        let mut lexer = Lexer::new(&file);
        assert_eq!(
            lexer.next_token().unwrap().kind,
            TokenKind::Float(1.2)
        );
        // The dangling dot is not a number start and is rejected downstream.
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_trailing_dot_still_makes_a_float() {
        assert_eq!(lex_num("12."), TokenKind::Float(12.0));
    }

    #[test]
    fn test_number_span() {
        let file = Arc::new(SourceFile::new("<test>", "  250"));
        let mut lexer = Lexer::new(&file);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.span.start.column, 2);
        assert_eq!(token.span.end.column, 5);
    }
}
