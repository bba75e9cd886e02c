//! parseflow-drv - Interpreter driver.
//!
//! Orchestrates the pipeline for the two front doors:
//!
//! 1. The REPL: read a line, run it against a persistent global scope,
//!    print the result (or the rendered diagnostic).
//! 2. Script mode: run a file once, nonzero exit on error.
//!
//! The driver also hosts the dump sinks (`--emit-tokens`, `--emit-ast`)
//! that write a linearized view of a script's token stream or syntax tree
//! to any `io::Write`.

use std::cell::RefCell;
use std::io::{self, BufRead as _, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context as _};

use parseflow_eval::{global_symbol_table, Interpreter, SymbolTable, Value};
use parseflow_util::{Diagnostic, SourceFile};

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Interactive shell.
    Repl,
    /// Execute a script file.
    Script(PathBuf),
    /// Print the token stream of a script and exit.
    EmitTokens(PathBuf),
    /// Print the linearized syntax tree of a script and exit.
    EmitAst(PathBuf),
    /// Print usage and exit.
    Help,
}

/// Driver configuration parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
}

impl Config {
    /// Parses command line arguments (without the program name).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Config> {
        let mut args = args.into_iter();
        let mut mode = Mode::Repl;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Config { mode: Mode::Help }),
                "--emit-tokens" => {
                    let path = args
                        .next()
                        .context("missing script path after '--emit-tokens'")?;
                    mode = Mode::EmitTokens(path.into());
                }
                "--emit-ast" => {
                    let path = args.next().context("missing script path after '--emit-ast'")?;
                    mode = Mode::EmitAst(path.into());
                }
                other if other.starts_with('-') => bail!("unknown option '{other}'"),
                path => {
                    if mode != Mode::Repl {
                        bail!("unexpected argument '{path}'");
                    }
                    mode = Mode::Script(path.into());
                }
            }
        }

        Ok(Config { mode })
    }
}

/// Usage text for `--help` and argument errors.
pub const USAGE: &str = "\
Usage: parseflow [OPTIONS] [SCRIPT]

Runs SCRIPT, or starts the interactive shell when no script is given.

Options:
  --emit-tokens <SCRIPT>  Print the token stream and exit
  --emit-ast <SCRIPT>     Print the linearized syntax tree and exit
  -h, --help              Print help
";

/// A persistent interpreter session.
///
/// The global symbol table survives across `run` calls, which is what makes
/// the REPL stateful: `VAR x = 5` on one line is visible on the next.
pub struct Session {
    interp: Interpreter,
    globals: Rc<RefCell<SymbolTable>>,
}

impl Session {
    pub fn new() -> Session {
        Session {
            interp: Interpreter::new(),
            globals: global_symbol_table(),
        }
    }

    /// Runs `source` labelled as `file_label` against the session's globals.
    pub fn run(&mut self, file_label: &str, source: &str) -> (Option<Value>, Option<Diagnostic>) {
        let file = Arc::new(SourceFile::new(file_label, source));
        match self.interp.run_program(&file, &self.globals) {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// REPL result formatting: a single-statement line prints its one value,
/// a multi-statement line prints the whole statement list.
pub fn render_result(value: &Value) -> String {
    if let Value::List(items) = value {
        let items = items.borrow();
        if items.len() == 1 {
            return items[0].repr();
        }
    }
    value.repr()
}

/// Writes the token stream of `source` to `sink`, one token per line.
pub fn emit_tokens(file_label: &str, source: &str, sink: &mut dyn Write) -> anyhow::Result<()> {
    let file = Arc::new(SourceFile::new(file_label, source));
    let tokens = parseflow_lex::tokenize(&file)?;
    for token in tokens {
        writeln!(
            sink,
            "{:?} @ {}..{}",
            token.kind, token.span.start.index, token.span.end.index
        )?;
    }
    Ok(())
}

/// Writes the linearized syntax tree of `source` to `sink`.
pub fn emit_ast(file_label: &str, source: &str, sink: &mut dyn Write) -> anyhow::Result<()> {
    let file = Arc::new(SourceFile::new(file_label, source));
    let tokens = parseflow_lex::tokenize(&file)?;
    let ast = parseflow_par::parse(tokens, &file)?;
    writeln!(sink, "{}", ast.dump())?;
    Ok(())
}

/// Entry point behind the `parseflow` binary.
pub fn main() -> anyhow::Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;
    match config.mode {
        Mode::Repl => repl(),
        Mode::Script(path) => run_script(&path),
        Mode::EmitTokens(path) => {
            let source = read_script(&path)?;
            emit_tokens(&path.display().to_string(), &source, &mut io::stdout().lock())
        }
        Mode::EmitAst(path) => {
            let source = read_script(&path)?;
            emit_ast(&path.display().to_string(), &source, &mut io::stdout().lock())
        }
        Mode::Help => {
            print!("{USAGE}");
            Ok(())
        }
    }
}

/// The interactive shell: reads lines until `exit` or end of input.
pub fn repl() -> anyhow::Result<()> {
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "parseflow > ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        let (value, error) = session.run("<stdin>", line);
        if let Some(error) = error {
            writeln!(stdout, "{}", error.render())?;
        } else if let Some(value) = value {
            writeln!(stdout, "{}", render_result(&value))?;
        }
    }

    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script '{}'", path.display()))
}

fn run_script(path: &Path) -> anyhow::Result<()> {
    let source = read_script(path)?;
    let mut session = Session::new();
    let (_, error) = session.run(&path.display().to_string(), &source);
    if let Some(error) = error {
        bail!("\n{}", error.render());
    }
    Ok(())
}
