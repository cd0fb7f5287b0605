//! Theory Lisp: a Lisp-family language whose distinguishing feature is a
//! first-class multi-tape automaton expression, plus Polish-notation (PN)
//! blocks that reify a sequence of applications as an arity-aware callable.
//!
//! The runtime is a straightforward tree-walking interpreter: [`lexer`]
//! turns source text into tokens, [`parser`] turns tokens into an [`Expr`]
//! tree, and [`runtime`] evaluates that tree against an [`Env`] frame chain.
//! [`builtin`] supplies the primitive library; [`automaton`] is the
//! multi-tape machine engine invoked by `Expr::call` on an `Automaton` node.

pub mod automaton;
pub mod builtin;
pub mod cli;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use error::{Result, TheoryLispError};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::{Expr, ExprKind, Parser};
pub use runtime::{Env, Value};
