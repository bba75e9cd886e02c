//! AST node definitions.
//!
//! Every node carries the span it was parsed from. Function bodies are
//! `Rc`-shared so a closure value created from a `FuncDef` keeps its body
//! alive after the rest of the tree is dropped (the REPL drops each line's
//! tree once it has run).

use std::fmt::Write as _;
use std::rc::Rc;

use parseflow_util::Span;

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    /// Prefix `+` (identity on numbers).
    Pos,
    /// Prefix `-`.
    Neg,
    /// `NOT`.
    Not,
}

/// One `IF`/`ELIF` arm.
#[derive(Clone, Debug, PartialEq)]
pub struct IfCase {
    pub cond: Node,
    pub body: Node,
    pub is_block: bool,
}

/// The `ELSE` arm.
#[derive(Clone, Debug, PartialEq)]
pub struct ElseCase {
    pub body: Box<Node>,
    pub is_block: bool,
}

/// A syntax tree node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Linearized single-line dump of the tree (the `--emit-ast` format).
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out);
        out
    }

    fn dump_into(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Number(n) => {
                let _ = write!(out, "(number {n})");
            }
            NodeKind::Str(s) => {
                let _ = write!(out, "(string {s:?})");
            }
            NodeKind::List(elements) => {
                out.push_str("(list");
                for element in elements {
                    out.push(' ');
                    element.dump_into(out);
                }
                out.push(')');
            }
            NodeKind::VarAccess(name) => {
                let _ = write!(out, "(var-access {name})");
            }
            NodeKind::VarAssign { name, value } => {
                let _ = write!(out, "(var-assign {name} ");
                value.dump_into(out);
                out.push(')');
            }
            NodeKind::BinOp { lhs, op, rhs } => {
                let _ = write!(out, "(binop {op:?} ");
                lhs.dump_into(out);
                out.push(' ');
                rhs.dump_into(out);
                out.push(')');
            }
            NodeKind::UnaryOp { op, operand } => {
                let _ = write!(out, "(unaryop {op:?} ");
                operand.dump_into(out);
                out.push(')');
            }
            NodeKind::If { cases, else_case } => {
                out.push_str("(if");
                for case in cases {
                    out.push_str(" (case ");
                    case.cond.dump_into(out);
                    out.push(' ');
                    case.body.dump_into(out);
                    out.push(')');
                }
                if let Some(else_case) = else_case {
                    out.push_str(" (else ");
                    else_case.body.dump_into(out);
                    out.push(')');
                }
                out.push(')');
            }
            NodeKind::For {
                var,
                start,
                end,
                step,
                body,
                ..
            } => {
                let _ = write!(out, "(for {var} ");
                start.dump_into(out);
                out.push(' ');
                end.dump_into(out);
                if let Some(step) = step {
                    out.push(' ');
                    step.dump_into(out);
                }
                out.push(' ');
                body.dump_into(out);
                out.push(')');
            }
            NodeKind::While { cond, body, .. } => {
                out.push_str("(while ");
                cond.dump_into(out);
                out.push(' ');
                body.dump_into(out);
                out.push(')');
            }
            NodeKind::FuncDef {
                name, params, body, ..
            } => {
                let _ = write!(
                    out,
                    "(fun {} ({})",
                    name.as_deref().unwrap_or("<anonymous>"),
                    params.join(" ")
                );
                out.push(' ');
                body.dump_into(out);
                out.push(')');
            }
            NodeKind::Call { callee, args } => {
                out.push_str("(call ");
                callee.dump_into(out);
                for arg in args {
                    out.push(' ');
                    arg.dump_into(out);
                }
                out.push(')');
            }
            NodeKind::Return(value) => {
                out.push_str("(return");
                if let Some(value) = value {
                    out.push(' ');
                    value.dump_into(out);
                }
                out.push(')');
            }
            NodeKind::Continue => out.push_str("(continue)"),
            NodeKind::Break => out.push_str("(break)"),
        }
    }
}

/// Node payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Numeric literal (unified `f64` model).
    Number(f64),

    /// String literal.
    Str(String),

    /// List literal; statement sequences also parse to this.
    List(Vec<Node>),

    /// Read a variable.
    VarAccess(String),

    /// `VAR name = value`.
    VarAssign { name: String, value: Box<Node> },

    /// Binary operation.
    BinOp {
        lhs: Box<Node>,
        op: BinOp,
        rhs: Box<Node>,
    },

    /// Unary operation.
    UnaryOp { op: UnOp, operand: Box<Node> },

    /// `IF`/`ELIF`/`ELSE` chain.
    If {
        cases: Vec<IfCase>,
        else_case: Option<ElseCase>,
    },

    /// `FOR var = start TO end (STEP step)? THEN body`.
    For {
        var: String,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
        is_block: bool,
    },

    /// `WHILE cond THEN body`.
    While {
        cond: Box<Node>,
        body: Box<Node>,
        is_block: bool,
    },

    /// `FUN name?(params) -> expr` or `FUN name?(params) NEWLINE body END`.
    FuncDef {
        name: Option<String>,
        params: Vec<String>,
        body: Rc<Node>,
        auto_return: bool,
    },

    /// Call expression.
    Call { callee: Box<Node>, args: Vec<Node> },

    /// `RETURN expr?`.
    Return(Option<Box<Node>>),

    /// `CONTINUE`.
    Continue,

    /// `BREAK`.
    Break,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind) -> Node {
        Node::new(kind, Span::DUMMY)
    }

    #[test]
    fn test_dump_literals() {
        assert_eq!(node(NodeKind::Number(5.0)).dump(), "(number 5)");
        assert_eq!(node(NodeKind::Str("hi".into())).dump(), "(string \"hi\")");
    }

    #[test]
    fn test_dump_binop() {
        let tree = node(NodeKind::BinOp {
            lhs: Box::new(node(NodeKind::Number(1.0))),
            op: BinOp::Add,
            rhs: Box::new(node(NodeKind::Number(2.0))),
        });
        assert_eq!(tree.dump(), "(binop Add (number 1) (number 2))");
    }

    #[test]
    fn test_dump_call() {
        let tree = node(NodeKind::Call {
            callee: Box::new(node(NodeKind::VarAccess("f".into()))),
            args: vec![node(NodeKind::Number(7.0))],
        });
        assert_eq!(tree.dump(), "(call (var-access f) (number 7))");
    }
}
