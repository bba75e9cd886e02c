//! parseflow-util - Foundation types for the ParseFlow interpreter.
//!
//! This crate provides the pieces every pipeline stage depends on:
//! - `span` - source positions, spans, and source file bookkeeping
//! - `diagnostic` - the closed error taxonomy and its rendered form

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, ErrorKind, TraceFrame};
pub use span::{Position, SourceFile, Span};

/// Convenient result alias used by every pipeline stage.
pub type PfResult<T> = std::result::Result<T, Diagnostic>;
