//! Parses a Theory Lisp token stream into an [`Expr`] tree.

mod expr;
mod parser;

pub use expr::{Arg, Expr, ExprKind};
pub use parser::Parser;
