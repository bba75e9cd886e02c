//! Identifier and keyword lexing.

use crate::token::{Keyword, Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword.
    ///
    /// Lexeme shape is `[A-Za-z_][A-Za-z_0-9]*`; lexemes in the keyword set
    /// become `TokenKind::Keyword`.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.pos();

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_alphanumeric() || c == '_' {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let lexeme = self.cursor.slice_from(start);
        match Keyword::from_lexeme(lexeme) {
            Some(kw) => self.make(TokenKind::Keyword(kw)),
            None => self.make(TokenKind::Ident(lexeme.to_string())),
        }
    }
}
