//! Statement and control-flow parsing.
//!
//! Covers statement lists, the `RETURN`/`CONTINUE`/`BREAK` statements, and
//! the constructs that exist in both inline (`THEN stmt`) and block
//! (`THEN NEWLINE statements END`) form.

use parseflow_lex::{Keyword, TokenKind};

use crate::ast::{ElseCase, IfCase, Node, NodeKind};
use crate::{ParseResult, Parser};

impl Parser {
    /// `statements : NEWLINE* statement (NEWLINE+ statement)* NEWLINE*`
    ///
    /// A trailing alternative that fails without consuming input ends the
    /// list cleanly instead of erroring (that is what allows `END`, `ELIF`
    /// and friends to terminate a block body).
    pub(crate) fn statements(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;
        let mut statements = Vec::new();

        while self.current().kind == TokenKind::Newline {
            res.register_advancement();
            self.advance();
        }

        let Some(first) = res.register(self.statement()) else {
            return res;
        };
        statements.push(first);

        loop {
            let mut newline_count = 0;
            while self.current().kind == TokenKind::Newline {
                res.register_advancement();
                self.advance();
                newline_count += 1;
            }
            if newline_count == 0 {
                break;
            }

            match res.try_register(self.statement()) {
                Some(statement) => statements.push(statement),
                None => {
                    let rewind = res.to_reverse_count;
                    self.reverse(rewind);
                    break;
                }
            }
        }

        let span = self.span_from(start);
        res.success(Node::new(NodeKind::List(statements), span))
    }

    /// `statement : RETURN expr? | CONTINUE | BREAK | expr`
    pub(crate) fn statement(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;

        if self.current().kind.is_keyword(Keyword::Return) {
            res.register_advancement();
            self.advance();

            // The return value is optional; rewind if nothing parses.
            let value = match res.try_register(self.expr()) {
                Some(value) => Some(Box::new(value)),
                None => {
                    let rewind = res.to_reverse_count;
                    self.reverse(rewind);
                    None
                }
            };
            let span = self.span_from(start);
            return res.success(Node::new(NodeKind::Return(value), span));
        }

        if self.current().kind.is_keyword(Keyword::Continue) {
            res.register_advancement();
            self.advance();
            return res.success(Node::new(NodeKind::Continue, self.span_from(start)));
        }

        if self.current().kind.is_keyword(Keyword::Break) {
            res.register_advancement();
            self.advance();
            return res.success(Node::new(NodeKind::Break, self.span_from(start)));
        }

        let Some(expr) = res.register(self.expr()) else {
            return res.failure(self.syntax_error(
                "Expected 'RETURN', 'CONTINUE', 'BREAK', 'VAR', 'IF', 'FOR', 'WHILE', \
                 'FUN', int, float, identifier, '+', '-', '(', '[' or 'NOT'",
            ));
        };
        res.success(expr)
    }

    /// `if_expr : IF expr THEN (stmt if_tail | NEWLINE statements (END | if_tail))`
    pub(crate) fn if_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;

        let Some((cases, else_case)) = self.if_cases(Keyword::If, &mut res) else {
            return res;
        };
        let span = self.span_from(start);
        res.success(Node::new(NodeKind::If { cases, else_case }, span))
    }

    /// Parses one `IF`/`ELIF` arm plus everything chained behind it.
    ///
    /// Returns `None` with the error recorded in `res`.
    fn if_cases(
        &mut self,
        case_kw: Keyword,
        res: &mut ParseResult,
    ) -> Option<(Vec<IfCase>, Option<ElseCase>)> {
        let mut cases = Vec::new();
        let mut else_case = None;

        if !self.current().kind.is_keyword(case_kw) {
            res.fail(self.syntax_error(&format!("Expected '{}'", case_kw.as_str())));
            return None;
        }
        res.register_advancement();
        self.advance();

        let cond = res.register(self.expr())?;

        if !self.current().kind.is_keyword(Keyword::Then) {
            res.fail(self.syntax_error("Expected 'THEN'"));
            return None;
        }
        res.register_advancement();
        self.advance();

        if self.current().kind == TokenKind::Newline {
            res.register_advancement();
            self.advance();

            let body = res.register(self.statements())?;
            cases.push(IfCase {
                cond,
                body,
                is_block: true,
            });

            if self.current().kind.is_keyword(Keyword::End) {
                res.register_advancement();
                self.advance();
            } else if self.current().kind.is_keyword(Keyword::Elif)
                || self.current().kind.is_keyword(Keyword::Else)
            {
                let (more, els) = self.if_tail(res)?;
                cases.extend(more);
                else_case = els;
            } else {
                res.fail(self.syntax_error("Expected 'ELIF', 'ELSE' or 'END'"));
                return None;
            }
        } else {
            let body = res.register(self.statement())?;
            cases.push(IfCase {
                cond,
                body,
                is_block: false,
            });

            let (more, els) = self.if_tail(res)?;
            cases.extend(more);
            else_case = els;
        }

        Some((cases, else_case))
    }

    /// The continuation after an arm: an `ELIF` chain or an optional `ELSE`.
    fn if_tail(&mut self, res: &mut ParseResult) -> Option<(Vec<IfCase>, Option<ElseCase>)> {
        if self.current().kind.is_keyword(Keyword::Elif) {
            self.if_cases(Keyword::Elif, res)
        } else {
            let else_case = self.else_case(res)?;
            Some((Vec::new(), else_case))
        }
    }

    /// `else_case : (ELSE (stmt | NEWLINE statements END))?`
    fn else_case(&mut self, res: &mut ParseResult) -> Option<Option<ElseCase>> {
        if !self.current().kind.is_keyword(Keyword::Else) {
            return Some(None);
        }
        res.register_advancement();
        self.advance();

        if self.current().kind == TokenKind::Newline {
            res.register_advancement();
            self.advance();

            let body = res.register(self.statements())?;
            if !self.current().kind.is_keyword(Keyword::End) {
                res.fail(self.syntax_error("Expected 'END'"));
                return None;
            }
            res.register_advancement();
            self.advance();

            Some(Some(ElseCase {
                body: Box::new(body),
                is_block: true,
            }))
        } else {
            let body = res.register(self.statement())?;
            Some(Some(ElseCase {
                body: Box::new(body),
                is_block: false,
            }))
        }
    }

    /// `for_expr : FOR IDENT EQ expr TO expr (STEP expr)? THEN body`
    pub(crate) fn for_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;

        if !self.current().kind.is_keyword(Keyword::For) {
            return res.failure(self.syntax_error("Expected 'FOR'"));
        }
        res.register_advancement();
        self.advance();

        let var = match &self.current().kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return res.failure(self.syntax_error("Expected identifier")),
        };
        res.register_advancement();
        self.advance();

        if self.current().kind != TokenKind::Eq {
            return res.failure(self.syntax_error("Expected '='"));
        }
        res.register_advancement();
        self.advance();

        let Some(start_value) = res.register(self.expr()) else {
            return res;
        };

        if !self.current().kind.is_keyword(Keyword::To) {
            return res.failure(self.syntax_error("Expected 'TO'"));
        }
        res.register_advancement();
        self.advance();

        let Some(end_value) = res.register(self.expr()) else {
            return res;
        };

        let step = if self.current().kind.is_keyword(Keyword::Step) {
            res.register_advancement();
            self.advance();
            let Some(step) = res.register(self.expr()) else {
                return res;
            };
            Some(Box::new(step))
        } else {
            None
        };

        if !self.current().kind.is_keyword(Keyword::Then) {
            return res.failure(self.syntax_error("Expected 'THEN'"));
        }
        res.register_advancement();
        self.advance();

        let (body, is_block) = match self.loop_body(&mut res) {
            Some(body) => body,
            None => return res,
        };

        let span = self.span_from(start);
        res.success(Node::new(
            NodeKind::For {
                var,
                start: Box::new(start_value),
                end: Box::new(end_value),
                step,
                body: Box::new(body),
                is_block,
            },
            span,
        ))
    }

    /// `while_expr : WHILE expr THEN body`
    pub(crate) fn while_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;

        if !self.current().kind.is_keyword(Keyword::While) {
            return res.failure(self.syntax_error("Expected 'WHILE'"));
        }
        res.register_advancement();
        self.advance();

        let Some(cond) = res.register(self.expr()) else {
            return res;
        };

        if !self.current().kind.is_keyword(Keyword::Then) {
            return res.failure(self.syntax_error("Expected 'THEN'"));
        }
        res.register_advancement();
        self.advance();

        let (body, is_block) = match self.loop_body(&mut res) {
            Some(body) => body,
            None => return res,
        };

        let span = self.span_from(start);
        res.success(Node::new(
            NodeKind::While {
                cond: Box::new(cond),
                body: Box::new(body),
                is_block,
            },
            span,
        ))
    }

    /// The body after `THEN`: one statement, or `NEWLINE statements END`.
    fn loop_body(&mut self, res: &mut ParseResult) -> Option<(Node, bool)> {
        if self.current().kind == TokenKind::Newline {
            res.register_advancement();
            self.advance();

            let body = res.register(self.statements())?;
            if !self.current().kind.is_keyword(Keyword::End) {
                res.fail(self.syntax_error("Expected 'END'"));
                return None;
            }
            res.register_advancement();
            self.advance();
            Some((body, true))
        } else {
            let body = res.register(self.statement())?;
            Some((body, false))
        }
    }

    /// `func_def : FUN IDENT? LPAREN (IDENT (COMMA IDENT)*)? RPAREN
    ///            (ARROW expr | NEWLINE statements END)`
    pub(crate) fn func_def(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;

        if !self.current().kind.is_keyword(Keyword::Fun) {
            return res.failure(self.syntax_error("Expected 'FUN'"));
        }
        res.register_advancement();
        self.advance();

        let name = match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                res.register_advancement();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        if self.current().kind != TokenKind::LParen {
            let details = if name.is_some() {
                "Expected '('"
            } else {
                "Expected identifier or '('"
            };
            return res.failure(self.syntax_error(details));
        }
        res.register_advancement();
        self.advance();

        let mut params = Vec::new();
        if let TokenKind::Ident(param) = &self.current().kind {
            params.push(param.clone());
            res.register_advancement();
            self.advance();

            while self.current().kind == TokenKind::Comma {
                res.register_advancement();
                self.advance();
                match &self.current().kind {
                    TokenKind::Ident(param) => params.push(param.clone()),
                    _ => return res.failure(self.syntax_error("Expected identifier")),
                }
                res.register_advancement();
                self.advance();
            }

            if self.current().kind != TokenKind::RParen {
                return res.failure(self.syntax_error("Expected ',' or ')'"));
            }
        } else if self.current().kind != TokenKind::RParen {
            return res.failure(self.syntax_error("Expected identifier or ')'"));
        }
        res.register_advancement();
        self.advance();

        if self.current().kind == TokenKind::Arrow {
            res.register_advancement();
            self.advance();

            let Some(body) = res.register(self.expr()) else {
                return res;
            };
            let span = self.span_from(start);
            return res.success(Node::new(
                NodeKind::FuncDef {
                    name,
                    params,
                    body: body.into(),
                    auto_return: true,
                },
                span,
            ));
        }

        if self.current().kind != TokenKind::Newline {
            return res.failure(self.syntax_error("Expected '->' or NEWLINE"));
        }
        res.register_advancement();
        self.advance();

        let Some(body) = res.register(self.statements()) else {
            return res;
        };

        if !self.current().kind.is_keyword(Keyword::End) {
            return res.failure(self.syntax_error("Expected 'END'"));
        }
        res.register_advancement();
        self.advance();

        let span = self.span_from(start);
        res.success(Node::new(
            NodeKind::FuncDef {
                name,
                params,
                body: body.into(),
                auto_return: false,
            },
            span,
        ))
    }
}
