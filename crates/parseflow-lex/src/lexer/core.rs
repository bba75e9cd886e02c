//! Core lexer implementation.
//!
//! This module contains the main Lexer struct and its dispatch loop.

use std::sync::Arc;

use parseflow_util::{Diagnostic, PfResult, Position, SourceFile, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Lexer for ParseFlow source text.
///
/// Transforms a [`SourceFile`] into a token stream terminated by
/// [`TokenKind::Eof`]. The first lexical error aborts the stage.
pub struct Lexer<'a> {
    /// Character cursor over the file content.
    pub(crate) cursor: Cursor<'a>,

    /// File being lexed, shared into tokens' diagnostics.
    pub(crate) file: Arc<SourceFile>,

    /// Position where the current token starts.
    pub(crate) token_start: Position,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `file`'s content.
    pub fn new(file: &'a Arc<SourceFile>) -> Self {
        Self {
            cursor: Cursor::new(file.content()),
            file: Arc::clone(file),
            token_start: Position::START,
        }
    }

    /// Lexes the whole input.
    ///
    /// The returned vector always ends with an `Eof` token.
    pub fn tokenize(mut self) -> PfResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Returns the next token from the source.
    ///
    /// Skips whitespace and comments, then dispatches on the current
    /// character.
    pub fn next_token(&mut self) -> PfResult<Token> {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.pos();

        if self.cursor.is_at_end() {
            return Ok(self.make(TokenKind::Eof));
        }

        match self.cursor.current_char() {
            '\n' | ';' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Newline))
            }
            '+' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Plus))
            }
            '-' => Ok(self.lex_minus()),
            '*' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Star))
            }
            '/' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Slash))
            }
            '^' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Caret))
            }
            '(' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::LParen))
            }
            ')' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::RParen))
            }
            '[' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::LSquare))
            }
            ']' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::RSquare))
            }
            ',' => {
                self.cursor.advance();
                Ok(self.make(TokenKind::Comma))
            }
            '=' => Ok(self.lex_equals()),
            '!' => self.lex_bang(),
            '<' => Ok(self.lex_less()),
            '>' => Ok(self.lex_greater()),
            '"' => self.lex_string(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_identifier()),
            c => {
                self.cursor.advance();
                Err(Diagnostic::illegal_char(
                    c,
                    self.token_span(),
                    Arc::clone(&self.file),
                ))
            }
        }
    }

    /// Span from the start of the current token to the cursor.
    pub(crate) fn token_span(&self) -> Span {
        Span::new(self.token_start, self.cursor.pos())
    }

    /// Builds a token with the current token span.
    pub(crate) fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.token_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;
    use parseflow_util::ErrorKind;

    fn lex(source: &str) -> PfResult<Vec<Token>> {
        let file = Arc::new(SourceFile::new("<test>", source));
        Lexer::new(&file).tokenize()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lexes cleanly")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(kinds("  \t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_var_assignment() {
        assert_eq!(
            kinds("VAR x = 42"),
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Ident("x".into()),
                TokenKind::Eq,
                TokenKind::Int(42.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newline_and_semicolon_both_separate() {
        assert_eq!(
            kinds("1\n2;3"),
            vec![
                TokenKind::Int(1.0),
                TokenKind::Newline,
                TokenKind::Int(2.0),
                TokenKind::Newline,
                TokenKind::Int(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_newline() {
        assert_eq!(
            kinds("1 # add the rest later\n2"),
            vec![
                TokenKind::Int(1.0),
                TokenKind::Newline,
                TokenKind::Int(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_only_line_still_separates() {
        assert_eq!(
            kinds("# heading\n5"),
            vec![TokenKind::Newline, TokenKind::Int(5.0), TokenKind::Eof]
        );
    }

    #[test]
    fn test_call_with_args() {
        assert_eq!(
            kinds("f(1, 2)"),
            vec![
                TokenKind::Ident("f".into()),
                TokenKind::LParen,
                TokenKind::Int(1.0),
                TokenKind::Comma,
                TokenKind::Int(2.0),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_illegal_char() {
        let err = lex("VAR a = @").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalChar);
        assert_eq!(err.message, "'@'");
        assert_eq!(err.span.start.column, 8);
    }

    #[test]
    fn test_spans_are_ordered() {
        let tokens = lex("VAR total = 1 + 2.5\nPRINT(total)").unwrap();
        for token in &tokens {
            assert!(token.span.start.index <= token.span.end.index);
        }
        for pair in tokens.windows(2) {
            assert!(pair[0].span.end.index <= pair[1].span.start.index);
        }
    }

    #[test]
    fn test_eof_span_at_end_of_input() {
        let tokens = lex("abc").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span.start.index, 3);
        assert!(eof.span.is_empty());
    }
}
