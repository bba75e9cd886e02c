//! Runtime values and the operator dispatch surface.
//!
//! Numbers live on a single `f64` model and double as booleans (0 is false,
//! anything else true). Strings are immutable; lists are shared and mutable
//! through the built-ins. Operator application returns the failure message
//! only; the interpreter attaches span and call-frame context.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use parseflow_par::{ast::BinOp, ast::UnOp, Node};

use crate::env::Context;

/// Message for operator/operand combinations the language does not define.
pub const ILLEGAL_OPERATION: &str = "Illegal operation";

/// A user-defined function value.
pub struct Closure {
    /// Definition name; `None` for anonymous functions.
    pub name: Option<String>,
    /// Parameter names, bound positionally.
    pub params: Vec<String>,
    /// Shared body node (outlives the tree it was parsed in).
    pub body: Rc<Node>,
    /// Inline `-> expr` form implicitly returns the body value.
    pub auto_return: bool,
    /// Environment captured at definition time.
    pub defining_context: Rc<Context>,
}

impl Closure {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The captured context chain may be cyclic through the symbol table,
        // so only the name is printed.
        write!(f, "Closure({})", self.display_name())
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Number; also the boolean representation.
    Number(f64),
    /// Immutable text.
    Str(Rc<str>),
    /// Shared, mutable list.
    List(Rc<RefCell<Vec<Value>>>),
    /// User-defined function.
    Function(Rc<Closure>),
    /// Member of the built-in registry.
    Builtin(crate::builtins::Builtin),
    /// Result of valueless statements.
    Null,
}

impl Value {
    /// The canonical boolean encoding.
    pub fn bool(b: bool) -> Value {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) => "built-in function",
            Value::Null => "null",
        }
    }

    /// Truthiness: nonzero numbers, non-empty strings and lists, and all
    /// functions are true; null is false.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
            Value::Null => false,
        }
    }

    /// Equality across all value kinds.
    ///
    /// Structural for numbers, strings and lists; identity for functions;
    /// values of different kinds are unequal.
    pub fn eq_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eq_value(y))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// The stable `repr` form: quoted strings, bracketed lists, `null`.
    pub fn repr(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Str(s) => format!("{:?}", &**s),
            Value::List(items) => {
                let items = items.borrow();
                let parts: Vec<String> = items.iter().map(|v| v.repr()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Function(closure) => format!("<function {}>", closure.display_name()),
            Value::Builtin(builtin) => format!("<built-in function {}>", builtin.name()),
            Value::Null => "null".to_string(),
        }
    }

    /// The `str` form used by `PRINT`: like `repr`, but strings unquoted.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            other => other.repr(),
        }
    }

    /// Applies a binary operator.
    ///
    /// Errors carry only the message; the caller owns span and context.
    pub fn apply_binop(&self, op: BinOp, rhs: &Value) -> Result<Value, String> {
        match op {
            BinOp::And => Ok(Value::bool(self.is_true() && rhs.is_true())),
            BinOp::Or => Ok(Value::bool(self.is_true() || rhs.is_true())),
            BinOp::EqEq => Ok(Value::bool(self.eq_value(rhs))),
            BinOp::NotEq => Ok(Value::bool(!self.eq_value(rhs))),

            BinOp::Add => match (self, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{a}{b}"))),
                (Value::List(items), appended) => {
                    let mut items = items.borrow().clone();
                    items.push(appended.clone());
                    Ok(Value::list(items))
                }
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },

            BinOp::Sub => match (self, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                (Value::List(items), Value::Number(index)) => {
                    let mut items = items.borrow().clone();
                    let index = checked_index(*index, items.len()).ok_or(
                        "Element at this index could not be removed from list because \
                         index is out of bounds",
                    )?;
                    items.remove(index);
                    Ok(Value::list(items))
                }
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },

            BinOp::Mul => match (self, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                (Value::Str(s), Value::Number(count)) => {
                    if *count < 0.0 {
                        return Err("Repetition count must be non-negative".to_string());
                    }
                    Ok(Value::string(s.repeat(count.floor() as usize)))
                }
                (Value::List(a), Value::List(b)) => {
                    let mut items = a.borrow().clone();
                    if Rc::ptr_eq(a, b) {
                        let copy = items.clone();
                        items.extend(copy);
                    } else {
                        items.extend(b.borrow().iter().cloned());
                    }
                    Ok(Value::list(items))
                }
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },

            BinOp::Div => match (self, rhs) {
                (Value::Number(a), Value::Number(b)) => {
                    if *b == 0.0 {
                        Err("Division by zero".to_string())
                    } else {
                        Ok(Value::Number(a / b))
                    }
                }
                (Value::List(items), Value::Number(index)) => {
                    let items = items.borrow();
                    let index = checked_index(*index, items.len()).ok_or(
                        "Element at this index could not be retrieved from list because \
                         index is out of bounds",
                    )?;
                    Ok(items[index].clone())
                }
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },

            BinOp::Pow => match (self, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.powf(*b))),
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },

            BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => match (self, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::bool(match op {
                    BinOp::Lt => a < b,
                    BinOp::Gt => a > b,
                    BinOp::LtEq => a <= b,
                    _ => a >= b,
                })),
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },
        }
    }

    /// Applies a unary operator.
    pub fn apply_unop(&self, op: UnOp) -> Result<Value, String> {
        match op {
            UnOp::Pos => Ok(self.clone()),
            UnOp::Neg => match self {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(ILLEGAL_OPERATION.to_string()),
            },
            UnOp::Not => Ok(Value::bool(!self.is_true())),
        }
    }
}

/// Floors a numeric index and validates it against `len`.
pub(crate) fn checked_index(index: f64, len: usize) -> Option<usize> {
    if !index.is_finite() || index < 0.0 {
        return None;
    }
    let index = index.floor() as usize;
    if index < len {
        Some(index)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_arithmetic_matches_host() {
        assert!(num(1.0).apply_binop(BinOp::Add, &num(2.0)).unwrap().eq_value(&num(3.0)));
        assert!(num(9.0).apply_binop(BinOp::Sub, &num(4.0)).unwrap().eq_value(&num(5.0)));
        assert!(num(3.0).apply_binop(BinOp::Mul, &num(2.5)).unwrap().eq_value(&num(7.5)));
        assert!(num(7.0).apply_binop(BinOp::Div, &num(2.0)).unwrap().eq_value(&num(3.5)));
        assert!(num(2.0).apply_binop(BinOp::Pow, &num(10.0)).unwrap().eq_value(&num(1024.0)));
    }

    #[test]
    fn test_division_by_zero() {
        let err = num(1.0).apply_binop(BinOp::Div, &num(0.0)).unwrap_err();
        assert_eq!(err, "Division by zero");
    }

    #[test]
    fn test_string_concat_and_repeat() {
        let ab = Value::string("ab");
        let cd = Value::string("cd");
        assert_eq!(ab.apply_binop(BinOp::Add, &cd).unwrap().repr(), "\"abcd\"");
        assert_eq!(
            ab.apply_binop(BinOp::Mul, &num(2.9)).unwrap().repr(),
            "\"abab\""
        );
        assert!(ab.apply_binop(BinOp::Mul, &num(-1.0)).is_err());
    }

    #[test]
    fn test_list_append_is_non_destructive() {
        let list = Value::list(vec![num(1.0)]);
        let grown = list.apply_binop(BinOp::Add, &num(2.0)).unwrap();
        assert_eq!(grown.repr(), "[1, 2]");
        assert_eq!(list.repr(), "[1]");
    }

    #[test]
    fn test_list_remove_and_index() {
        let list = Value::list(vec![num(10.0), num(20.0), num(30.0)]);
        let removed = list.apply_binop(BinOp::Sub, &num(1.0)).unwrap();
        assert_eq!(removed.repr(), "[10, 30]");

        let picked = list.apply_binop(BinOp::Div, &num(2.0)).unwrap();
        assert!(picked.eq_value(&num(30.0)));

        assert!(list.apply_binop(BinOp::Div, &num(3.0)).is_err());
        assert!(list.apply_binop(BinOp::Div, &num(-1.0)).is_err());
    }

    #[test]
    fn test_list_extend_operator() {
        let a = Value::list(vec![num(1.0)]);
        let b = Value::list(vec![num(2.0), num(3.0)]);
        let joined = a.apply_binop(BinOp::Mul, &b).unwrap();
        assert_eq!(joined.repr(), "[1, 2, 3]");
        assert_eq!(a.repr(), "[1]");
    }

    #[test]
    fn test_list_extend_with_itself() {
        let a = Value::list(vec![num(1.0), num(2.0)]);
        let doubled = a.apply_binop(BinOp::Mul, &a).unwrap();
        assert_eq!(doubled.repr(), "[1, 2, 1, 2]");
    }

    #[test]
    fn test_comparisons_numeric_only() {
        assert!(num(1.0).apply_binop(BinOp::Lt, &num(2.0)).unwrap().is_true());
        assert!(!num(2.0).apply_binop(BinOp::Lt, &num(2.0)).unwrap().is_true());
        assert!(num(2.0).apply_binop(BinOp::LtEq, &num(2.0)).unwrap().is_true());
        assert!(Value::string("a").apply_binop(BinOp::Lt, &Value::string("b")).is_err());
    }

    #[test]
    fn test_equality_is_total() {
        assert!(Value::string("a").apply_binop(BinOp::EqEq, &Value::string("a")).unwrap().is_true());
        assert!(Value::string("a").apply_binop(BinOp::NotEq, &num(1.0)).unwrap().is_true());
        assert!(Value::Null.apply_binop(BinOp::EqEq, &Value::Null).unwrap().is_true());
        let list = Value::list(vec![num(1.0)]);
        let same = Value::list(vec![num(1.0)]);
        assert!(list.apply_binop(BinOp::EqEq, &same).unwrap().is_true());
    }

    #[test]
    fn test_logic_uses_truthiness() {
        let and = Value::string("x").apply_binop(BinOp::And, &num(2.0)).unwrap();
        assert!(and.eq_value(&num(1.0)));
        let or = Value::Null.apply_binop(BinOp::Or, &Value::Null).unwrap();
        assert!(or.eq_value(&num(0.0)));
    }

    #[test]
    fn test_truthiness() {
        assert!(num(0.5).is_true());
        assert!(!num(0.0).is_true());
        assert!(!Value::string("").is_true());
        assert!(Value::string("x").is_true());
        assert!(!Value::list(vec![]).is_true());
        assert!(Value::list(vec![num(0.0)]).is_true());
        assert!(!Value::Null.is_true());
    }

    #[test]
    fn test_unary_ops() {
        assert!(num(5.0).apply_unop(UnOp::Neg).unwrap().eq_value(&num(-5.0)));
        assert!(num(5.0).apply_unop(UnOp::Pos).unwrap().eq_value(&num(5.0)));
        assert!(num(0.0).apply_unop(UnOp::Not).unwrap().eq_value(&num(1.0)));
        assert!(num(3.0).apply_unop(UnOp::Not).unwrap().eq_value(&num(0.0)));
        assert!(Value::string("x").apply_unop(UnOp::Neg).is_err());
    }

    #[test]
    fn test_repr_forms() {
        assert_eq!(num(5.0).repr(), "5");
        assert_eq!(num(2.5).repr(), "2.5");
        assert_eq!(Value::string("a\nb").repr(), "\"a\\nb\"");
        assert_eq!(Value::Null.repr(), "null");
        assert_eq!(
            Value::list(vec![num(1.0), Value::string("x")]).repr(),
            "[1, \"x\"]"
        );
    }

    #[test]
    fn test_display_string_unquotes() {
        assert_eq!(Value::string("hi").to_display_string(), "hi");
        assert_eq!(num(8.0).to_display_string(), "8");
    }

    #[test]
    fn test_illegal_operations() {
        assert!(num(1.0).apply_binop(BinOp::Add, &Value::string("x")).is_err());
        assert!(Value::string("x").apply_binop(BinOp::Sub, &Value::string("y")).is_err());
        assert!(Value::Null.apply_binop(BinOp::Pow, &num(2.0)).is_err());
    }
}
