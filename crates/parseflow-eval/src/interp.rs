//! Tree-walking interpreter.
//!
//! Evaluation returns `Result<Signal, Diagnostic>`: errors short-circuit
//! through `?`, while the non-local control signals (`Return`, `Continue`,
//! `Break`) travel inside `Ok` and are consumed by the smallest enclosing
//! construct that understands them (loops for break/continue, calls for
//! return).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use parseflow_par::ast::{Node, NodeKind};
use parseflow_util::{Diagnostic, PfResult, SourceFile, Span};

use crate::builtins::{Io, StdIo};
use crate::env::{Context, SymbolTable};
use crate::value::{Closure, Value};

/// Result of evaluating one node.
#[derive(Debug)]
pub enum Signal {
    /// Plain value (possibly null).
    Value(Value),
    /// `RETURN` travelling to the nearest call boundary.
    Return(Value),
    /// `CONTINUE` travelling to the nearest loop.
    Continue,
    /// `BREAK` travelling to the nearest loop.
    Break,
}

impl Signal {
    /// The carried value; bare control signals decay to null.
    pub fn into_value(self) -> Value {
        match self {
            Signal::Value(value) | Signal::Return(value) => value,
            Signal::Continue | Signal::Break => Value::Null,
        }
    }
}

/// The evaluator. Owns the I/O seam used by the built-ins.
pub struct Interpreter {
    pub(crate) io: Box<dyn Io>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_io(Box::new(StdIo))
    }

    /// An interpreter whose built-ins read and write through `io`.
    pub fn with_io(io: Box<dyn Io>) -> Self {
        Self { io }
    }

    /// Lexes, parses, and evaluates `file` in a fresh root context over
    /// `globals`. This is the driver entry point and the engine behind the
    /// `RUN` built-in.
    pub fn run_program(
        &mut self,
        file: &Arc<SourceFile>,
        globals: &Rc<RefCell<SymbolTable>>,
    ) -> PfResult<Value> {
        let tokens = parseflow_lex::tokenize(file)?;
        let ast = parseflow_par::parse(tokens, file)?;
        let ctx = Context::root(Arc::clone(file), Rc::clone(globals));
        Ok(self.eval(&ast, &ctx)?.into_value())
    }

    /// Evaluates one node. The AST is never mutated.
    pub fn eval(&mut self, node: &Node, ctx: &Rc<Context>) -> PfResult<Signal> {
        match &node.kind {
            NodeKind::Number(n) => Ok(Signal::Value(Value::Number(*n))),

            NodeKind::Str(s) => Ok(Signal::Value(Value::string(s.as_str()))),

            NodeKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match self.eval(element, ctx)? {
                        Signal::Value(value) => values.push(value),
                        signal => return Ok(signal),
                    }
                }
                Ok(Signal::Value(Value::list(values)))
            }

            NodeKind::VarAccess(name) => {
                let value = ctx.symbols.borrow().get(name);
                match value {
                    Some(value) => Ok(Signal::Value(value)),
                    None => Err(self.rt_error(format!("'{name}' is not defined"), node.span, ctx)),
                }
            }

            NodeKind::VarAssign { name, value } => {
                let value = match self.eval(value, ctx)? {
                    Signal::Value(value) => value,
                    signal => return Ok(signal),
                };
                ctx.symbols.borrow_mut().set(name.clone(), value.clone());
                Ok(Signal::Value(value))
            }

            NodeKind::BinOp { lhs, op, rhs } => {
                let left = match self.eval(lhs, ctx)? {
                    Signal::Value(value) => value,
                    signal => return Ok(signal),
                };
                let right = match self.eval(rhs, ctx)? {
                    Signal::Value(value) => value,
                    signal => return Ok(signal),
                };
                left.apply_binop(*op, &right)
                    .map(Signal::Value)
                    .map_err(|message| self.rt_error(message, node.span, ctx))
            }

            NodeKind::UnaryOp { op, operand } => {
                let value = match self.eval(operand, ctx)? {
                    Signal::Value(value) => value,
                    signal => return Ok(signal),
                };
                value
                    .apply_unop(*op)
                    .map(Signal::Value)
                    .map_err(|message| self.rt_error(message, node.span, ctx))
            }

            NodeKind::If { cases, else_case } => {
                for case in cases {
                    let cond = match self.eval(&case.cond, ctx)? {
                        Signal::Value(value) => value,
                        signal => return Ok(signal),
                    };
                    if cond.is_true() {
                        let body = match self.eval(&case.body, ctx)? {
                            Signal::Value(value) => value,
                            signal => return Ok(signal),
                        };
                        let result = if case.is_block { Value::Null } else { body };
                        return Ok(Signal::Value(result));
                    }
                }
                if let Some(else_case) = else_case {
                    let body = match self.eval(&else_case.body, ctx)? {
                        Signal::Value(value) => value,
                        signal => return Ok(signal),
                    };
                    let result = if else_case.is_block { Value::Null } else { body };
                    return Ok(Signal::Value(result));
                }
                Ok(Signal::Value(Value::Null))
            }

            NodeKind::For {
                var,
                start,
                end,
                step,
                body,
                is_block,
            } => {
                let mut i = self.eval_number(start, ctx)?;
                let end_value = self.eval_number(end, ctx)?;
                let step_value = match step {
                    Some(step) => self.eval_number(step, ctx)?,
                    None => 1.0,
                };

                let mut collected = Vec::new();
                loop {
                    let more = if step_value >= 0.0 {
                        i < end_value
                    } else {
                        i > end_value
                    };
                    if !more {
                        break;
                    }

                    ctx.symbols.borrow_mut().set(var.clone(), Value::Number(i));
                    i += step_value;

                    match self.eval(body, ctx)? {
                        Signal::Value(value) => {
                            if !is_block {
                                collected.push(value);
                            }
                        }
                        Signal::Continue => {}
                        Signal::Break => break,
                        ret @ Signal::Return(_) => return Ok(ret),
                    }
                }

                let result = if *is_block {
                    Value::Null
                } else {
                    Value::list(collected)
                };
                Ok(Signal::Value(result))
            }

            NodeKind::While {
                cond,
                body,
                is_block,
            } => {
                let mut collected = Vec::new();
                loop {
                    let test = match self.eval(cond, ctx)? {
                        Signal::Value(value) => value,
                        signal => return Ok(signal),
                    };
                    if !test.is_true() {
                        break;
                    }

                    match self.eval(body, ctx)? {
                        Signal::Value(value) => {
                            if !is_block {
                                collected.push(value);
                            }
                        }
                        Signal::Continue => {}
                        Signal::Break => break,
                        ret @ Signal::Return(_) => return Ok(ret),
                    }
                }

                let result = if *is_block {
                    Value::Null
                } else {
                    Value::list(collected)
                };
                Ok(Signal::Value(result))
            }

            NodeKind::FuncDef {
                name,
                params,
                body,
                auto_return,
            } => {
                let closure = Rc::new(Closure {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    auto_return: *auto_return,
                    defining_context: Rc::clone(ctx),
                });
                let value = Value::Function(closure);
                if let Some(name) = name {
                    ctx.symbols.borrow_mut().set(name.clone(), value.clone());
                }
                Ok(Signal::Value(value))
            }

            NodeKind::Call { callee, args } => {
                let callee_value = match self.eval(callee, ctx)? {
                    Signal::Value(value) => value,
                    signal => return Ok(signal),
                };

                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval(arg, ctx)? {
                        Signal::Value(value) => arg_values.push(value),
                        signal => return Ok(signal),
                    }
                }

                match callee_value {
                    Value::Function(closure) => self
                        .call_function(&closure, arg_values, node.span, ctx)
                        .map(Signal::Value),
                    Value::Builtin(builtin) => self
                        .call_builtin(builtin, arg_values, node.span, ctx)
                        .map(Signal::Value),
                    other => Err(self.rt_error(
                        format!("Expected function, got {}", other.type_name()),
                        node.span,
                        ctx,
                    )),
                }
            }

            NodeKind::Return(value) => {
                let value = match value {
                    Some(expr) => match self.eval(expr, ctx)? {
                        Signal::Value(value) => value,
                        signal => return Ok(signal),
                    },
                    None => Value::Null,
                };
                Ok(Signal::Return(value))
            }

            NodeKind::Continue => Ok(Signal::Continue),

            NodeKind::Break => Ok(Signal::Break),
        }
    }

    /// Calls a user-defined function.
    ///
    /// A fresh symbol table (parented to the captured environment) receives
    /// the arguments; the execution context records the call site so a stack
    /// trace can point back here.
    fn call_function(
        &mut self,
        closure: &Rc<Closure>,
        args: Vec<Value>,
        call_span: Span,
        caller: &Rc<Context>,
    ) -> PfResult<Value> {
        let name = closure.display_name().to_string();

        if args.len() != closure.params.len() {
            let (diff, which) = if args.len() > closure.params.len() {
                (args.len() - closure.params.len(), "many")
            } else {
                (closure.params.len() - args.len(), "few")
            };
            return Err(self.rt_error(
                format!("{diff} too {which} args passed into '{name}'"),
                call_span,
                caller,
            ));
        }

        let symbols = Rc::new(RefCell::new(SymbolTable::with_parent(Rc::clone(
            &closure.defining_context.symbols,
        ))));
        {
            let mut symbols = symbols.borrow_mut();
            for (param, arg) in closure.params.iter().zip(args) {
                symbols.set(param.clone(), arg);
            }
        }

        let exec_ctx = closure.defining_context.child(
            name,
            call_span,
            Arc::clone(&closure.defining_context.file),
            symbols,
        );

        let result = self.eval(&closure.body, &exec_ctx)?;
        Ok(match result {
            Signal::Value(value) => {
                if closure.auto_return {
                    value
                } else {
                    Value::Null
                }
            }
            Signal::Return(value) => value,
            // Loop signals never cross a call boundary.
            Signal::Continue | Signal::Break => Value::Null,
        })
    }

    /// Evaluates a node that must produce a number (loop bounds and step).
    fn eval_number(&mut self, node: &Node, ctx: &Rc<Context>) -> PfResult<f64> {
        match self.eval(node, ctx)?.into_value() {
            Value::Number(n) => Ok(n),
            other => Err(self.rt_error(
                format!("Expected number, got {}", other.type_name()),
                node.span,
                ctx,
            )),
        }
    }

    /// A runtime diagnostic with the call-frame trace attached.
    pub(crate) fn rt_error(
        &self,
        message: impl Into<String>,
        span: Span,
        ctx: &Rc<Context>,
    ) -> Diagnostic {
        let file = Arc::clone(&ctx.file);
        let trace = ctx.trace(span, &file);
        Diagnostic::runtime(message, span, file).with_trace(trace)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
