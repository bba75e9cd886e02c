//! Whitespace and comment skipping.

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips spaces, tabs, and `#` comments.
    ///
    /// Newlines are significant (they separate statements) and are never
    /// consumed here; a comment runs up to, but not including, the newline
    /// that ends its line, so a comment-only line still yields a `Newline`
    /// token.
    pub(crate) fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' => self.cursor.advance(),
                '\r' => self.cursor.advance(),
                '#' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::Lexer;
    use parseflow_util::SourceFile;
    use std::sync::Arc;

    fn first_kind(source: &str) -> TokenKind {
        let file = Arc::new(SourceFile::new("<test>", source));
        let mut lexer = Lexer::new(&file);
        lexer.next_token().expect("lexes cleanly").kind
    }

    #[test]
    fn test_skip_spaces_and_tabs() {
        assert_eq!(first_kind("  \t  7"), TokenKind::Int(7.0));
    }

    #[test]
    fn test_comment_to_end_of_input() {
        assert_eq!(first_kind("# only a comment"), TokenKind::Eof);
    }

    #[test]
    fn test_comment_leaves_newline() {
        assert_eq!(first_kind("# comment\n7"), TokenKind::Newline);
    }

    #[test]
    fn test_carriage_return_skipped() {
        assert_eq!(first_kind("\r\n"), TokenKind::Newline);
    }
}
