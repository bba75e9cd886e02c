//! Expression parsing.
//!
//! The precedence ladder, lowest binding first:
//!
//! | Rule | Operators |
//! |---|---|
//! | `expr` | `VAR` assignment, `AND`, `OR` |
//! | `comp_expr` | `NOT`, `==`, `!=`, `<`, `>`, `<=`, `>=` |
//! | `arith_expr` | `+`, `-` |
//! | `term` | `*`, `/` |
//! | `factor` | unary `+`, `-` |
//! | `power` | `^` (right-associative) |
//! | `call` | call arguments |
//! | `atom` | literals, grouping, lists, control-flow expressions |

use parseflow_lex::{Keyword, TokenKind};
use parseflow_util::Span;

use crate::ast::{BinOp, Node, NodeKind, UnOp};
use crate::{ParseResult, Parser};

impl Parser {
    /// `expr : VAR IDENT EQ expr | comp_expr ((AND|OR) comp_expr)*`
    pub(crate) fn expr(&mut self) -> ParseResult {
        let mut res = ParseResult::default();

        if self.current().kind.is_keyword(Keyword::Var) {
            let start = self.current().span.start;
            res.register_advancement();
            self.advance();

            let name = match &self.current().kind {
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

            let Some(value) = res.register(self.expr()) else {
                return res;
            };
            let span = Span::new(start, value.span.end);
            return res.success(Node::new(
                NodeKind::VarAssign {
                    name,
                    value: Box::new(value),
                },
                span,
            ));
        }

        let Some(node) =
            res.register(self.bin_op(Self::comp_expr, &[BinOp::And, BinOp::Or], Self::comp_expr))
        else {
            return res.failure(self.syntax_error(
                "Expected 'VAR', 'IF', 'FOR', 'WHILE', 'FUN', int, float, identifier, \
                 '+', '-', '(', '[' or 'NOT'",
            ));
        };
        res.success(node)
    }

    /// `comp_expr : NOT comp_expr | arith_expr ((EE|NE|LT|GT|LTE|GTE) arith_expr)*`
    pub(crate) fn comp_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::default();

        if self.current().kind.is_keyword(Keyword::Not) {
            let start = self.current().span.start;
            res.register_advancement();
            self.advance();

            let Some(operand) = res.register(self.comp_expr()) else {
                return res;
            };
            let span = Span::new(start, operand.span.end);
            return res.success(Node::new(
                NodeKind::UnaryOp {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let Some(node) = res.register(self.bin_op(
            Self::arith_expr,
            &[
                BinOp::EqEq,
                BinOp::NotEq,
                BinOp::Lt,
                BinOp::Gt,
                BinOp::LtEq,
                BinOp::GtEq,
            ],
            Self::arith_expr,
        )) else {
            return res.failure(self.syntax_error(
                "Expected int, float, identifier, '+', '-', '(', '[', 'IF', 'FOR', \
                 'WHILE', 'FUN' or 'NOT'",
            ));
        };
        res.success(node)
    }

    /// `arith_expr : term ((PLUS|MINUS) term)*`
    pub(crate) fn arith_expr(&mut self) -> ParseResult {
        self.bin_op(Self::term, &[BinOp::Add, BinOp::Sub], Self::term)
    }

    /// `term : factor ((MUL|DIV) factor)*`
    pub(crate) fn term(&mut self) -> ParseResult {
        self.bin_op(Self::factor, &[BinOp::Mul, BinOp::Div], Self::factor)
    }

    /// `factor : (PLUS|MINUS) factor | power`
    pub(crate) fn factor(&mut self) -> ParseResult {
        let op = match self.current().kind {
            TokenKind::Plus => Some(UnOp::Pos),
            TokenKind::Minus => Some(UnOp::Neg),
            _ => None,
        };

        if let Some(op) = op {
            let mut res = ParseResult::default();
            let start = self.current().span.start;
            res.register_advancement();
            self.advance();

            let Some(operand) = res.register(self.factor()) else {
                return res;
            };
            let span = Span::new(start, operand.span.end);
            return res.success(Node::new(
                NodeKind::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        self.power()
    }

    /// `power : call (POW factor)*`
    ///
    /// The right operand re-enters `factor`, which makes `^` right
    /// associative: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    pub(crate) fn power(&mut self) -> ParseResult {
        self.bin_op(Self::call, &[BinOp::Pow], Self::factor)
    }

    /// `call : atom (LPAREN (expr (COMMA expr)*)? RPAREN)?`
    pub(crate) fn call(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let Some(atom) = res.register(self.atom()) else {
            return res;
        };

        if self.current().kind != TokenKind::LParen {
            return res.success(atom);
        }
        res.register_advancement();
        self.advance();

        let mut args = Vec::new();
        if self.current().kind == TokenKind::RParen {
            res.register_advancement();
            self.advance();
        } else {
            let Some(first) = res.register(self.expr()) else {
                return res.failure(self.syntax_error(
                    "Expected ')', 'VAR', 'IF', 'FOR', 'WHILE', 'FUN', int, float, \
                     identifier, '+', '-', '(', '[' or 'NOT'",
                ));
            };
            args.push(first);

            while self.current().kind == TokenKind::Comma {
                res.register_advancement();
                self.advance();
                let Some(arg) = res.register(self.expr()) else {
                    return res;
                };
                args.push(arg);
            }

            if self.current().kind != TokenKind::RParen {
                return res.failure(self.syntax_error("Expected ',' or ')'"));
            }
            res.register_advancement();
            self.advance();
        }

        let span = Span::new(atom.span.start, self.prev_end());
        res.success(Node::new(
            NodeKind::Call {
                callee: Box::new(atom),
                args,
            },
            span,
        ))
    }

    /// `atom : INT | FLOAT | STRING | IDENT | LPAREN expr RPAREN | list_expr
    ///        | if_expr | for_expr | while_expr | func_def`
    pub(crate) fn atom(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let token = self.current().clone();

        match token.kind {
            TokenKind::Int(value) | TokenKind::Float(value) => {
                res.register_advancement();
                self.advance();
                res.success(Node::new(NodeKind::Number(value), token.span))
            }
            TokenKind::Str(value) => {
                res.register_advancement();
                self.advance();
                res.success(Node::new(NodeKind::Str(value), token.span))
            }
            TokenKind::Ident(name) => {
                res.register_advancement();
                self.advance();
                res.success(Node::new(NodeKind::VarAccess(name), token.span))
            }
            TokenKind::LParen => {
                res.register_advancement();
                self.advance();
                let Some(inner) = res.register(self.expr()) else {
                    return res;
                };
                if self.current().kind != TokenKind::RParen {
                    return res.failure(self.syntax_error("Expected ')'"));
                }
                res.register_advancement();
                self.advance();
                res.success(inner)
            }
            TokenKind::LSquare => self.list_expr(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            TokenKind::Keyword(Keyword::Fun) => self.func_def(),
            _ => res.failure(self.syntax_error(
                "Expected int, float, identifier, '+', '-', '(', '[', 'IF', 'FOR', \
                 'WHILE' or 'FUN'",
            )),
        }
    }

    /// `list_expr : LSQUARE (expr (COMMA expr)*)? RSQUARE`
    pub(crate) fn list_expr(&mut self) -> ParseResult {
        let mut res = ParseResult::default();
        let start = self.current().span.start;

        if self.current().kind != TokenKind::LSquare {
            return res.failure(self.syntax_error("Expected '['"));
        }
        res.register_advancement();
        self.advance();

        let mut elements = Vec::new();
        if self.current().kind == TokenKind::RSquare {
            res.register_advancement();
            self.advance();
        } else {
            let Some(first) = res.register(self.expr()) else {
                return res.failure(self.syntax_error(
                    "Expected ']', 'VAR', 'IF', 'FOR', 'WHILE', 'FUN', int, float, \
                     identifier, '+', '-', '(', '[' or 'NOT'",
                ));
            };
            elements.push(first);

            while self.current().kind == TokenKind::Comma {
                res.register_advancement();
                self.advance();
                let Some(element) = res.register(self.expr()) else {
                    return res;
                };
                elements.push(element);
            }

            if self.current().kind != TokenKind::RSquare {
                return res.failure(self.syntax_error("Expected ',' or ']'"));
            }
            res.register_advancement();
            self.advance();
        }

        let span = self.span_from(start);
        res.success(Node::new(NodeKind::List(elements), span))
    }

    /// Maps the current token to a binary operator.
    fn peek_binop(&self) -> Option<BinOp> {
        match &self.current().kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Caret => Some(BinOp::Pow),
            TokenKind::EqEq => Some(BinOp::EqEq),
            TokenKind::NotEq => Some(BinOp::NotEq),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::LtEq => Some(BinOp::LtEq),
            TokenKind::GtEq => Some(BinOp::GtEq),
            TokenKind::Keyword(Keyword::And) => Some(BinOp::And),
            TokenKind::Keyword(Keyword::Or) => Some(BinOp::Or),
            _ => None,
        }
    }

    /// `func_a ((op in allowed) func_b)*`, left associative.
    fn bin_op(
        &mut self,
        func_a: fn(&mut Parser) -> ParseResult,
        allowed: &[BinOp],
        func_b: fn(&mut Parser) -> ParseResult,
    ) -> ParseResult {
        let mut res = ParseResult::default();
        let Some(mut left) = res.register(func_a(self)) else {
            return res;
        };

        while let Some(op) = self.peek_binop().filter(|op| allowed.contains(op)) {
            res.register_advancement();
            self.advance();
            let Some(right) = res.register(func_b(self)) else {
                return res;
            };
            let span = left.span.merge(right.span);
            left = Node::new(
                NodeKind::BinOp {
                    lhs: Box::new(left),
                    op,
                    rhs: Box::new(right),
                },
                span,
            );
        }

        res.success(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{parse_single, parse_source};
    use parseflow_util::ErrorKind;

    fn assert_binop(node: &Node, op: BinOp) -> (&Node, &Node) {
        match &node.kind {
            NodeKind::BinOp { lhs, op: got, rhs } => {
                assert_eq!(*got, op, "expected {op:?}");
                (lhs.as_ref(), rhs.as_ref())
            }
            other => panic!("expected BinOp {op:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_number_literal() {
        let node = parse_single("42");
        assert_eq!(node.kind, NodeKind::Number(42.0));
    }

    #[test]
    fn test_string_literal() {
        let node = parse_single("\"hi\"");
        assert_eq!(node.kind, NodeKind::Str("hi".into()));
    }

    #[test]
    fn test_var_access() {
        let node = parse_single("total");
        assert_eq!(node.kind, NodeKind::VarAccess("total".into()));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let node = parse_single("1 + 2 * 3");
        let (lhs, rhs) = assert_binop(&node, BinOp::Add);
        assert_eq!(lhs.kind, NodeKind::Number(1.0));
        assert_binop(rhs, BinOp::Mul);
    }

    #[test]
    fn test_left_associative_subtraction() {
        let node = parse_single("9 - 4 - 2");
        let (lhs, _) = assert_binop(&node, BinOp::Sub);
        assert_binop(lhs, BinOp::Sub);
    }

    #[test]
    fn test_power_is_right_associative() {
        let node = parse_single("2 ^ 3 ^ 2");
        let (lhs, rhs) = assert_binop(&node, BinOp::Pow);
        assert_eq!(lhs.kind, NodeKind::Number(2.0));
        assert_binop(rhs, BinOp::Pow);
    }

    #[test]
    fn test_parens_override_precedence() {
        let node = parse_single("(1 + 2) * 3");
        let (lhs, _) = assert_binop(&node, BinOp::Mul);
        assert_binop(lhs, BinOp::Add);
    }

    #[test]
    fn test_comparison_below_arithmetic() {
        let node = parse_single("1 + 2 == 3");
        assert_binop(&node, BinOp::EqEq);
    }

    #[test]
    fn test_logic_below_comparison() {
        let node = parse_single("1 == 1 AND 2 == 2");
        assert_binop(&node, BinOp::And);
    }

    #[test]
    fn test_unary_minus() {
        let node = parse_single("-5");
        match &node.kind {
            NodeKind::UnaryOp { op, operand } => {
                assert_eq!(*op, UnOp::Neg);
                assert_eq!(operand.kind, NodeKind::Number(5.0));
            }
            other => panic!("expected unary, got {other:?}"),
        }
    }

    #[test]
    fn test_not_operator() {
        let node = parse_single("NOT 1 == 2");
        match &node.kind {
            NodeKind::UnaryOp { op, operand } => {
                assert_eq!(*op, UnOp::Not);
                assert_binop(operand, BinOp::EqEq);
            }
            other => panic!("expected unary, got {other:?}"),
        }
    }

    #[test]
    fn test_var_assign() {
        let node = parse_single("VAR x = 1 + 2");
        match &node.kind {
            NodeKind::VarAssign { name, value } => {
                assert_eq!(name, "x");
                assert_binop(value, BinOp::Add);
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_var_assign_missing_name() {
        let err = parse_source("VAR = 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
        assert_eq!(err.message, "Expected identifier");
    }

    #[test]
    fn test_var_assign_missing_eq() {
        let err = parse_source("VAR x 1").unwrap_err();
        assert_eq!(err.message, "Expected '='");
    }

    #[test]
    fn test_call_no_args() {
        let node = parse_single("f()");
        match &node.kind {
            NodeKind::Call { callee, args } => {
                assert_eq!(callee.kind, NodeKind::VarAccess("f".into()));
                assert!(args.is_empty());
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_call_with_args() {
        let node = parse_single("f(1, 2 + 3, \"x\")");
        match &node.kind {
            NodeKind::Call { args, .. } => assert_eq!(args.len(), 3),
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_call_missing_close() {
        let err = parse_source("f(1, 2").unwrap_err();
        assert_eq!(err.message, "Expected ',' or ')'");
    }

    #[test]
    fn test_empty_list() {
        let node = parse_single("[]");
        assert_eq!(node.kind, NodeKind::List(vec![]));
    }

    #[test]
    fn test_list_elements() {
        let node = parse_single("[1, 2, 3]");
        match &node.kind {
            NodeKind::List(elements) => assert_eq!(elements.len(), 3),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_list_missing_close() {
        let err = parse_source("[1, 2").unwrap_err();
        assert_eq!(err.message, "Expected ',' or ']'");
    }

    #[test]
    fn test_nested_calls() {
        let node = parse_single("f(g(1))");
        match &node.kind {
            NodeKind::Call { callee, args } => {
                assert_eq!(callee.kind, NodeKind::VarAccess("f".into()));
                assert_eq!(args.len(), 1);
                assert!(matches!(args[0].kind, NodeKind::Call { .. }));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_call_binds_tighter_than_power() {
        let node = parse_single("f(2) ^ 3");
        let (lhs, _) = assert_binop(&node, BinOp::Pow);
        assert!(matches!(lhs.kind, NodeKind::Call { .. }));
    }
}
