//! Centralised error hierarchy for the **loxwalk interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; that is the job of a
//! [`Reporter`] chosen by the caller.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either ` at 'lexeme'` or ` at end`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure (misplaced `break`, `return`, `this`, …).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error, located at the offending token.
    #[error("{message}\n[line {line}] at '{lexeme}'")]
    Runtime {
        message: String,
        lexeme: String,
        line: usize,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            location: location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            location: location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: line={}, lexeme={}, msg={}",
            token.line, token.lexeme, message
        );

        LoxError::Runtime {
            message,
            lexeme: token.lexeme.to_string(),
            line: token.line,
        }
    }

    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. }
            | LoxError::Runtime { line, .. } => Some(*line),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }

    /// `true` for errors raised while the program was running.
    pub fn is_runtime(&self) -> bool {
        matches!(self, LoxError::Runtime { .. })
    }
}

fn location(token: &Token<'_>) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Diagnostics sink.  The parser, resolver and interpreter never print: they
/// hand every error to a reporter and carry on (or stop) as their contract says.
pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

/// Collects diagnostics in memory.
impl Reporter for Vec<LoxError> {
    fn report(&mut self, error: &LoxError) {
        // LoxError holds io::Error, so it cannot derive Clone.
        let copy = match error {
            LoxError::Lex { message, line } => LoxError::Lex {
                message: message.clone(),
                line: *line,
            },
            LoxError::Parse {
                message,
                location,
                line,
            } => LoxError::Parse {
                message: message.clone(),
                location: location.clone(),
                line: *line,
            },
            LoxError::Resolve {
                message,
                location,
                line,
            } => LoxError::Resolve {
                message: message.clone(),
                location: location.clone(),
                line: *line,
            },
            LoxError::Runtime {
                message,
                lexeme,
                line,
            } => LoxError::Runtime {
                message: message.clone(),
                lexeme: lexeme.clone(),
                line: *line,
            },
            LoxError::Io(e) => LoxError::Io(io::Error::new(e.kind(), e.to_string())),
            LoxError::Utf8(e) => LoxError::Utf8(*e),
        };

        self.push(copy);
    }
}

/// Writes each diagnostic to standard error, one per line.
#[derive(Debug, Default)]
pub struct StderrReporter {
    pub reported: usize,
}

impl Reporter for StderrReporter {
    fn report(&mut self, error: &LoxError) {
        self.reported += 1;

        eprintln!("{}", error);
    }
}
