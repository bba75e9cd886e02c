//! parseflow-eval - Runtime values, environments, and the tree-walking
//! interpreter.
//!
//! The crate is organized like the rest of the pipeline:
//! - `value` - runtime values and operator dispatch
//! - `env` - symbol tables and call contexts
//! - `interp` - the evaluator and its control-flow signals
//! - `builtins` - the fixed built-in registry and the I/O seam

pub mod builtins;
pub mod env;
pub mod interp;
pub mod value;

pub use builtins::{global_symbol_table, registry, Builtin, Io, StdIo};
pub use env::{Context, SymbolTable};
pub use interp::{Interpreter, Signal};
pub use value::{Closure, Value};
