//! Built-in functions.
//!
//! The registry is fixed at startup and installed into the global symbol
//! table together with the predefined constants. Built-ins report failures
//! through the same diagnostic channel as everything else; they never panic
//! through the interpreter.

use std::cell::RefCell;
use std::io::{self, BufRead as _, Write as _};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use parseflow_util::{PfResult, SourceFile, Span};

use crate::env::{Context, SymbolTable};
use crate::interp::Interpreter;
use crate::value::{checked_index, Value};

/// I/O seam used by `PRINT`, `INPUT`, `INPUT_INT` and `CLEAR`.
///
/// The default implementation talks to the process's stdin/stdout; tests
/// substitute a buffer.
pub trait Io {
    /// Write `text` (no newline is added).
    fn write(&mut self, text: &str);

    /// Read one line, without its trailing newline. End of input is an
    /// error.
    fn read_line(&mut self) -> io::Result<String>;

    /// Clear the terminal.
    fn clear(&mut self);
}

/// Process stdin/stdout.
pub struct StdIo;

impl Io for StdIo {
    fn write(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    fn clear(&mut self) {
        self.write("\x1b[2J\x1b[H");
    }
}

/// The fixed built-in function set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Print,
    PrintRet,
    Input,
    InputInt,
    Clear,
    IsNum,
    IsStr,
    IsList,
    IsFun,
    Append,
    Pop,
    Extend,
    Len,
    Run,
}

impl Builtin {
    /// All built-ins, in registration order.
    pub const ALL: [Builtin; 14] = [
        Builtin::Print,
        Builtin::PrintRet,
        Builtin::Input,
        Builtin::InputInt,
        Builtin::Clear,
        Builtin::IsNum,
        Builtin::IsStr,
        Builtin::IsList,
        Builtin::IsFun,
        Builtin::Append,
        Builtin::Pop,
        Builtin::Extend,
        Builtin::Len,
        Builtin::Run,
    ];

    /// Name bound in the global symbol table.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "PRINT",
            Builtin::PrintRet => "PRINT_RET",
            Builtin::Input => "INPUT",
            Builtin::InputInt => "INPUT_INT",
            Builtin::Clear => "CLEAR",
            Builtin::IsNum => "IS_NUM",
            Builtin::IsStr => "IS_STR",
            Builtin::IsList => "IS_LIST",
            Builtin::IsFun => "IS_FUN",
            Builtin::Append => "APPEND",
            Builtin::Pop => "POP",
            Builtin::Extend => "EXTEND",
            Builtin::Len => "LEN",
            Builtin::Run => "RUN",
        }
    }

    /// Exact number of arguments.
    pub fn arity(&self) -> usize {
        match self {
            Builtin::Input | Builtin::InputInt | Builtin::Clear => 0,
            Builtin::Print
            | Builtin::PrintRet
            | Builtin::IsNum
            | Builtin::IsStr
            | Builtin::IsList
            | Builtin::IsFun
            | Builtin::Len
            | Builtin::Run => 1,
            Builtin::Append | Builtin::Pop | Builtin::Extend => 2,
        }
    }
}

/// The registry in stable registration order.
pub fn registry() -> IndexMap<&'static str, Builtin> {
    Builtin::ALL.iter().map(|b| (b.name(), *b)).collect()
}

/// A fresh global symbol table: predefined constants plus every built-in.
pub fn global_symbol_table() -> Rc<RefCell<SymbolTable>> {
    let mut table = SymbolTable::new();
    table.set("NULL", Value::Null);
    table.set("TRUE", Value::bool(true));
    table.set("FALSE", Value::bool(false));
    table.set("MATH_PI", Value::Number(std::f64::consts::PI));
    for (name, builtin) in registry() {
        table.set(name, Value::Builtin(builtin));
    }
    Rc::new(RefCell::new(table))
}

impl Interpreter {
    /// Dispatches a built-in call.
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        span: Span,
        ctx: &Rc<Context>,
    ) -> PfResult<Value> {
        let expected = builtin.arity();
        if args.len() != expected {
            let (diff, which) = if args.len() > expected {
                (args.len() - expected, "many")
            } else {
                (expected - args.len(), "few")
            };
            return Err(self.rt_error(
                format!("{diff} too {which} args passed into '{}'", builtin.name()),
                span,
                ctx,
            ));
        }

        match builtin {
            Builtin::Print => {
                self.io.write(&format!("{}\n", args[0].to_display_string()));
                Ok(Value::Null)
            }

            Builtin::PrintRet => Ok(Value::string(args[0].to_display_string())),

            Builtin::Input => match self.io.read_line() {
                Ok(line) => Ok(Value::string(line)),
                Err(err) => {
                    Err(self.rt_error(format!("Failed to read input: {err}"), span, ctx))
                }
            },

            Builtin::InputInt => loop {
                let line = match self.io.read_line() {
                    Ok(line) => line,
                    Err(err) => {
                        return Err(self.rt_error(
                            format!("Failed to read input: {err}"),
                            span,
                            ctx,
                        ))
                    }
                };
                match line.trim().parse::<i64>() {
                    Ok(n) => return Ok(Value::Number(n as f64)),
                    Err(_) => self
                        .io
                        .write(&format!("'{line}' must be an integer. Try again!\n")),
                }
            },

            Builtin::Clear => {
                self.io.clear();
                Ok(Value::Null)
            }

            Builtin::IsNum => Ok(Value::bool(matches!(args[0], Value::Number(_)))),
            Builtin::IsStr => Ok(Value::bool(matches!(args[0], Value::Str(_)))),
            Builtin::IsList => Ok(Value::bool(matches!(args[0], Value::List(_)))),
            Builtin::IsFun => Ok(Value::bool(matches!(
                args[0],
                Value::Function(_) | Value::Builtin(_)
            ))),

            Builtin::Append => match (&args[0], &args[1]) {
                (Value::List(items), value) => {
                    items.borrow_mut().push(value.clone());
                    Ok(Value::Null)
                }
                _ => Err(self.rt_error("First argument must be a list", span, ctx)),
            },

            Builtin::Pop => match (&args[0], &args[1]) {
                (Value::List(items), Value::Number(index)) => {
                    let mut items = items.borrow_mut();
                    let index = checked_index(*index, items.len()).ok_or_else(|| {
                        self.rt_error(
                            "Element at this index could not be removed from list \
                             because index is out of bounds",
                            span,
                            ctx,
                        )
                    })?;
                    Ok(items.remove(index))
                }
                (Value::List(_), _) => {
                    Err(self.rt_error("Second argument must be a number", span, ctx))
                }
                _ => Err(self.rt_error("First argument must be a list", span, ctx)),
            },

            Builtin::Extend => match (&args[0], &args[1]) {
                (Value::List(target), Value::List(source)) => {
                    if Rc::ptr_eq(target, source) {
                        let copy = target.borrow().clone();
                        target.borrow_mut().extend(copy);
                    } else {
                        let source = source.borrow();
                        target.borrow_mut().extend(source.iter().cloned());
                    }
                    Ok(Value::Null)
                }
                (Value::List(_), _) => {
                    Err(self.rt_error("Second argument must be a list", span, ctx))
                }
                _ => Err(self.rt_error("First argument must be a list", span, ctx)),
            },

            Builtin::Len => match &args[0] {
                Value::List(items) => Ok(Value::Number(items.borrow().len() as f64)),
                Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
                _ => Err(self.rt_error("Argument must be a list or string", span, ctx)),
            },

            Builtin::Run => match &args[0] {
                Value::Str(path) => self.run_script(path, span, ctx),
                _ => Err(self.rt_error("Argument must be a string", span, ctx)),
            },
        }
    }

    /// `RUN`: load a script by path and execute it in the global context.
    fn run_script(&mut self, path: &str, span: Span, ctx: &Rc<Context>) -> PfResult<Value> {
        let source = std::fs::read_to_string(path).map_err(|err| {
            self.rt_error(format!("Failed to load script \"{path}\"\n{err}"), span, ctx)
        })?;
        let file = Arc::new(SourceFile::new(path, source));

        let mut root = Rc::clone(ctx);
        while let Some(parent) = root.parent.clone() {
            root = parent;
        }
        let globals = Rc::clone(&root.symbols);

        match self.run_program(&file, &globals) {
            Ok(_) => Ok(Value::Null),
            Err(err) => Err(self.rt_error(
                format!(
                    "Failed to finish executing script \"{path}\"\n{}",
                    err.render()
                ),
                span,
                ctx,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_complete_and_ordered() {
        let registry = registry();
        assert_eq!(registry.len(), Builtin::ALL.len());
        assert_eq!(registry.get_index(0), Some((&"PRINT", &Builtin::Print)));
        assert_eq!(registry.get_index(13), Some((&"RUN", &Builtin::Run)));
    }

    #[test]
    fn test_arities() {
        assert_eq!(Builtin::Input.arity(), 0);
        assert_eq!(Builtin::Print.arity(), 1);
        assert_eq!(Builtin::Append.arity(), 2);
        assert_eq!(Builtin::Run.arity(), 1);
    }

    #[test]
    fn test_global_symbol_table_has_builtins_and_constants() {
        let globals = global_symbol_table();
        let globals = globals.borrow();
        assert!(matches!(globals.get("PRINT"), Some(Value::Builtin(Builtin::Print))));
        assert!(matches!(globals.get("RUN"), Some(Value::Builtin(Builtin::Run))));
        assert!(globals.get("TRUE").unwrap().eq_value(&Value::Number(1.0)));
        assert!(globals.get("FALSE").unwrap().eq_value(&Value::Number(0.0)));
        assert!(matches!(globals.get("NULL"), Some(Value::Null)));
        assert!(globals.get("MATH_PI").unwrap().eq_value(&Value::Number(std::f64::consts::PI)));
    }
}
