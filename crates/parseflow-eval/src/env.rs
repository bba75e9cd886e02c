//! Symbol tables and call contexts.
//!
//! A [`SymbolTable`] is a name→value map with an optional parent pointer:
//! reads walk the chain, writes stay local. A [`Context`] binds a symbol
//! table to a call frame (display name plus the span where the frame was
//! entered) for stack-trace rendering.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use parseflow_util::{SourceFile, Span, TraceFrame};
use rustc_hash::FxHashMap;

use crate::value::Value;

/// Name→value mapping with a lookup chain.
#[derive(Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, Value>,
    parent: Option<Rc<RefCell<SymbolTable>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Rc<RefCell<SymbolTable>>) -> Self {
        Self {
            symbols: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Looks up `name`, walking parent tables.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.symbols.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Binds `name` in this table (never in a parent).
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    /// Removes `name` from this table only.
    pub fn remove(&mut self, name: &str) {
        self.symbols.remove(name);
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values can refer back to this table through closures; print the
        // bound names only.
        let mut names: Vec<&str> = self.symbols.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SymbolTable")
            .field("symbols", &names)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// A call frame: display name, caller link, entry span, symbol table.
pub struct Context {
    /// `<program>` for the root, the function name for calls.
    pub display_name: String,
    /// Frame this one was entered from.
    pub parent: Option<Rc<Context>>,
    /// Call-site span recorded on entry (in the parent's file).
    pub parent_entry_span: Option<Span>,
    /// File the frame executes in.
    pub file: Arc<SourceFile>,
    /// Variables of this frame.
    pub symbols: Rc<RefCell<SymbolTable>>,
}

impl Context {
    /// The root `<program>` context over the global symbol table.
    pub fn root(file: Arc<SourceFile>, globals: Rc<RefCell<SymbolTable>>) -> Rc<Context> {
        Rc::new(Context {
            display_name: "<program>".to_string(),
            parent: None,
            parent_entry_span: None,
            file,
            symbols: globals,
        })
    }

    /// A child frame entered at `entry_span` (a call site in `self`'s file).
    pub fn child(
        self: &Rc<Self>,
        display_name: impl Into<String>,
        entry_span: Span,
        file: Arc<SourceFile>,
        symbols: Rc<RefCell<SymbolTable>>,
    ) -> Rc<Context> {
        Rc::new(Context {
            display_name: display_name.into(),
            parent: Some(Rc::clone(self)),
            parent_entry_span: Some(entry_span),
            file,
            symbols,
        })
    }

    /// Builds the trace for an error at `error_span`, innermost frame first.
    ///
    /// Each outer frame is located by the entry span its child recorded,
    /// which lives in the outer frame's file.
    pub fn trace(self: &Rc<Self>, error_span: Span, error_file: &Arc<SourceFile>) -> Vec<TraceFrame> {
        let mut frames = Vec::new();
        let mut span = error_span;
        let mut file = Arc::clone(error_file);
        let mut current = Some(Rc::clone(self));

        while let Some(ctx) = current {
            frames.push(TraceFrame {
                display_name: ctx.display_name.clone(),
                file: Arc::clone(&file),
                span,
            });
            match (ctx.parent_entry_span, &ctx.parent) {
                (Some(entry), Some(parent)) => {
                    span = entry;
                    file = Arc::clone(&parent.file);
                    current = Some(Rc::clone(parent));
                }
                _ => current = None,
            }
        }
        frames
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({})", self.display_name)
    }
}
