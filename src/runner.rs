//! The whole pipeline over one source text: scan, parse, resolve, interpret.
//!
//! Lexical and syntax errors are reported and the statements that did parse
//! still run.  Resolution errors stop the program before it starts.  The
//! returned [`Status`] says what the worst outcome was.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use log::info;

use crate::error::{LoxError, Reporter, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;

/// Outcome of a run, mapped onto the conventional process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// Lexical, syntax or resolution errors were reported.
    StaticError,
    /// The program stopped on a runtime error.
    RuntimeError,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::StaticError => 65,
            Status::RuntimeError => 70,
        }
    }
}

/// Forwards to the caller's reporter while keeping score.
struct Tally<'r> {
    inner: &'r mut dyn Reporter,
    static_errors: usize,
    runtime_errors: usize,
}

impl Reporter for Tally<'_> {
    fn report(&mut self, error: &LoxError) {
        if error.is_runtime() {
            self.runtime_errors += 1;
        } else {
            self.static_errors += 1;
        }

        self.inner.report(error);
    }
}

/// Decodes a source file's bytes.  Anything that is not UTF-8 is refused
/// before scanning starts.
pub fn decode(bytes: &[u8]) -> Result<&str> {
    Ok(std::str::from_utf8(bytes)?)
}

/// Runs `source` to completion, writing program output to `out` and every
/// diagnostic to `reporter`.
pub fn run_source(source: &str, out: Box<dyn Write>, reporter: &mut dyn Reporter) -> Status {
    let mut tally = Tally {
        inner: reporter,
        static_errors: 0,
        runtime_errors: 0,
    };

    let (tokens, lex_errors) = scanner::scan(source);

    for error in &lex_errors {
        tally.report(error);
    }

    let mut parser = Parser::new(&tokens);
    let statements = parser.parse(&mut tally);

    let mut interpreter = Interpreter::with_output(out);

    let resolved = Resolver::new(&mut interpreter).resolve(&statements, &mut tally);

    if resolved {
        interpreter.interpret(&statements, &mut tally);
    } else {
        info!("Resolution failed, program not run");
    }

    if tally.runtime_errors > 0 {
        Status::RuntimeError
    } else if tally.static_errors > 0 {
        Status::StaticError
    } else {
        Status::Ok
    }
}

/// In‑memory output sink that can be read back after the interpreter that
/// owned it is gone.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct Captured {
    pub output: String,
    pub errors: Vec<LoxError>,
    pub status: Status,
}

/// [`run_source`] with output and diagnostics captured in memory.
pub fn run_captured(source: &str) -> Captured {
    let buffer = SharedBuffer::default();
    let mut errors: Vec<LoxError> = Vec::new();

    let status = run_source(source, Box::new(buffer.clone()), &mut errors);

    Captured {
        output: buffer.contents(),
        errors,
        status,
    }
}
