use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::lexer::Scanner;
use crate::parser::{Expr, Parser};
use crate::runtime::{Env, Value};

/// Compile-time default for `$LIBRARY_DIR`, overridable via the environment
/// variable of the same name.
const DEFAULT_LIBRARY_DIR: &str = "/usr/local/lib";

fn resolve_path(name: &str) -> Option<PathBuf> {
    let literal = Path::new(name);
    if literal.is_file() {
        return Some(literal.to_path_buf());
    }
    let library_dir = std::env::var("LIBRARY_DIR").unwrap_or_else(|_| DEFAULT_LIBRARY_DIR.to_string());
    let candidate = Path::new(&library_dir).join(name);
    if candidate.is_file() {
        return Some(candidate);
    }
    None
}

/// `(include "name")`. Idempotent: installs a `Void` guard variable named
/// `<name>_included` in the global frame on first inclusion.
pub fn include(args: &[Value], env: &Env) -> Value {
    let name = match &args[0] {
        Value::Str(s) => s.clone(),
        other => {
            return Value::Error(format!("include: expected a string, got {}", other.type_name()))
        }
    };

    let guard = format!("{name}_included");
    if env.is_bound(&guard) {
        debug!(file = %name, "include: already included, skipping");
        return Value::Void;
    }

    let path = match resolve_path(&name) {
        Some(p) => p,
        None => return Value::Error(format!("include: could not find '{name}'")),
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => return Value::Error(format!("include: could not read '{name}': {e}")),
    };

    let tokens = match Scanner::new(&source).scan_tokens() {
        Ok(t) => t,
        Err(e) => return Value::Error(e.to_string()),
    };
    let program = match Parser::new(tokens).parse_program() {
        Ok(p) => p,
        Err(e) => return Value::Error(e.to_string()),
    };

    env.define_global(guard, Value::Void);
    for expr in &program {
        let result = Expr::interpret(expr, env);
        if let Value::Error(e) = result {
            warn!(file = %name, error = %e, "include: error while evaluating included file");
            return Value::Error(e);
        }
    }
    Value::Void
}
