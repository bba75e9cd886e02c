//! Operator and punctuation lexing.
//!
//! Single-character operators are handled directly in the dispatch; this
//! module covers the ones with multi-character forms.

use std::sync::Arc;

use parseflow_util::{Diagnostic, PfResult};

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes minus or arrow.
    ///
    /// Handles: `-`, `->`
    pub(crate) fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('>') {
            self.make(TokenKind::Arrow)
        } else {
            self.make(TokenKind::Minus)
        }
    }

    /// Lexes equals or equals-equals.
    ///
    /// Handles: `=`, `==`
    pub(crate) fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::EqEq)
        } else {
            self.make(TokenKind::Eq)
        }
    }

    /// Lexes not-equals.
    ///
    /// A bare `!` has no meaning in the language, so anything but `!=` is an
    /// `ExpectedCharError`.
    pub(crate) fn lex_bang(&mut self) -> PfResult<Token> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Ok(self.make(TokenKind::NotEq))
        } else {
            Err(Diagnostic::expected_char(
                "'=' (after '!')",
                self.token_span(),
                Arc::clone(&self.file),
            ))
        }
    }

    /// Lexes less or less-equals.
    ///
    /// Handles: `<`, `<=`
    pub(crate) fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::LtEq)
        } else {
            self.make(TokenKind::Lt)
        }
    }

    /// Lexes greater or greater-equals.
    ///
    /// Handles: `>`, `>=`
    pub(crate) fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::GtEq)
        } else {
            self.make(TokenKind::Gt)
        }
    }
}
