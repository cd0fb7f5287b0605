//! Error types for the Theory Lisp scanner and parser.
//!
//! Runtime failures are *not* represented here — per the language's design,
//! an evaluation failure is an ordinary [`crate::runtime::Value::Error`],
//! not a Rust `Result::Err`. This type covers only the host-level boundary:
//! reading source text and turning it into an expression tree.

use thiserror::Error;

/// Errors produced while scanning or parsing Theory Lisp source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TheoryLispError {
    /// Lexical or grammatical error, reported with source position.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Column number where the error occurred (1-indexed).
        column: usize,
        /// Description of the problem.
        message: String,
    },

    /// The token stream ended while a construct was still incomplete.
    #[error("Unexpected end of file")]
    UnexpectedEof,
}

impl TheoryLispError {
    /// Builds a syntax error at the given position.
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        TheoryLispError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Result type for scanning/parsing operations.
pub type Result<T> = std::result::Result<T, TheoryLispError>;
