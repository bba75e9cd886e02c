//! parseflow-par - Parser (syntactic analysis).
//!
//! A recursive-descent parser over the token stream, one method per grammar
//! rule. Alternatives that may fail without committing (a trailing statement,
//! a bare `RETURN`) are tried speculatively through [`ParseResult`], which
//! threads an advance count so the parser can rewind cleanly and keep the
//! deepest error for reporting.

pub mod ast;
mod expr;
mod stmt;

pub use ast::{BinOp, ElseCase, IfCase, Node, NodeKind, UnOp};

use std::sync::Arc;

use parseflow_lex::{Token, TokenKind};
use parseflow_util::{Diagnostic, PfResult, Position, SourceFile, Span};

/// Parses a token stream into the root statement-list node.
pub fn parse(tokens: Vec<Token>, file: &Arc<SourceFile>) -> PfResult<Node> {
    Parser::new(tokens, file).parse()
}

/// Outcome container threaded through every grammar rule.
///
/// `advance_count` counts the tokens a rule consumed. `try_register` records
/// the distance to rewind when a speculative alternative fails, and `failure`
/// only replaces an existing error when the failing rule had not consumed
/// anything, so the deepest partial match wins error reporting.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub node: Option<Node>,
    pub error: Option<Diagnostic>,
    pub advance_count: usize,
    pub to_reverse_count: usize,
    pub last_registered_advance_count: usize,
}

impl ParseResult {
    /// Record the consumption of one token.
    pub fn register_advancement(&mut self) {
        self.last_registered_advance_count = 1;
        self.advance_count += 1;
    }

    /// Absorb a child rule's outcome; `None` means its error is now ours.
    pub fn register(&mut self, res: ParseResult) -> Option<Node> {
        self.last_registered_advance_count = res.advance_count;
        self.advance_count += res.advance_count;
        if let Some(error) = res.error {
            self.error = Some(error);
            return None;
        }
        res.node
    }

    /// Absorb a child rule speculatively.
    ///
    /// On failure the child's error is dropped and its advance count is
    /// stored in `to_reverse_count` so the caller can rewind.
    pub fn try_register(&mut self, res: ParseResult) -> Option<Node> {
        if res.error.is_some() {
            self.to_reverse_count = res.advance_count;
            return None;
        }
        self.register(res)
    }

    /// Finish the rule with a node.
    pub fn success(mut self, node: Node) -> ParseResult {
        self.node = Some(node);
        self
    }

    /// Record an error in place, keeping a deeper existing one.
    pub fn fail(&mut self, error: Diagnostic) {
        if self.error.is_none() || self.last_registered_advance_count == 0 {
            self.error = Some(error);
        }
    }

    /// Finish the rule with an error, keeping a deeper existing one.
    pub fn failure(mut self, error: Diagnostic) -> ParseResult {
        self.fail(error);
        self
    }
}

/// Recursive descent parser.
pub struct Parser {
    /// Token stream, always terminated by `Eof`.
    tokens: Vec<Token>,

    /// Current position in the token stream.
    index: usize,

    /// File the tokens were lexed from, for diagnostics.
    file: Arc<SourceFile>,
}

impl Parser {
    /// Creates a parser over `tokens`.
    pub fn new(mut tokens: Vec<Token>, file: &Arc<SourceFile>) -> Self {
        if tokens.last().map(|t| t.kind != TokenKind::Eof).unwrap_or(true) {
            let at = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, Span::point(at)));
        }
        Self {
            tokens,
            index: 0,
            file: Arc::clone(file),
        }
    }

    /// Parses the whole stream into the root statement list.
    pub fn parse(&mut self) -> PfResult<Node> {
        let mut res = self.statements();
        if res.error.is_none() && self.current().kind != TokenKind::Eof {
            return Err(self.syntax_error("Token cannot appear after previous tokens"));
        }
        match res.node.take() {
            Some(node) if res.error.is_none() => Ok(node),
            _ => Err(res
                .error
                .unwrap_or_else(|| self.syntax_error("Expected statement"))),
        }
    }

    // =========================================================================
    // Token stream helpers
    // =========================================================================

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    /// Moves to the next token (saturating at `Eof`).
    pub(crate) fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Rewinds a failed speculation by `amount` tokens.
    pub(crate) fn reverse(&mut self, amount: usize) {
        self.index = self.index.saturating_sub(amount);
    }

    /// End of the most recently consumed token.
    pub(crate) fn prev_end(&self) -> Position {
        if self.index == 0 {
            self.current().span.start
        } else {
            self.tokens[self.index - 1].span.end
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.prev_end())
    }

    pub(crate) fn syntax_error(&self, details: &str) -> Diagnostic {
        Diagnostic::invalid_syntax(details, self.current().span, Arc::clone(&self.file))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn parse_source(source: &str) -> PfResult<Node> {
        let file = Arc::new(SourceFile::new("<test>", source));
        let tokens = parseflow_lex::tokenize(&file)?;
        parse(tokens, &file)
    }

    /// Unwraps the root statement list down to its single statement.
    pub fn parse_single(source: &str) -> Node {
        let root = parse_source(source).expect("parses cleanly");
        match root.kind {
            NodeKind::List(mut statements) => {
                assert_eq!(statements.len(), 1, "expected a single statement");
                statements.remove(0)
            }
            other => panic!("root should be a statement list, got {other:?}"),
        }
    }
}
