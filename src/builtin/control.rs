use crate::lexer::Scanner;
use crate::parser::{Expr, Parser};
use crate::runtime::{Env, Value};

/// `(error msg)` — constructs an Error value; the evaluator does the rest
/// of the propagation once this returns.
pub fn error(args: &[Value], _env: &Env) -> Value {
    match &args[0] {
        Value::Str(s) => Value::Error(s.clone()),
        other => Value::Error(other.to_display_string()),
    }
}

/// `(exit)` or `(exit code)`.
pub fn exit(args: &[Value], _env: &Env) -> Value {
    let code = if args.is_empty() {
        0
    } else {
        match args[0].as_i64_checked() {
            Some(n) => n,
            None => return Value::Error("exit: expected an integer code".to_string()),
        }
    };
    std::process::exit(code as i32);
}

/// `(eval source)` — scans, parses, and interprets a string of Theory Lisp
/// source in the global frame reachable from `env`, returning the value of
/// the last top-level expression (`Void` if the source is empty).
pub fn eval(args: &[Value], env: &Env) -> Value {
    let source = match &args[0] {
        Value::Str(s) => s,
        other => return Value::Error(format!("eval: expected a string, got {}", other.type_name())),
    };
    let tokens = match Scanner::new(source).scan_tokens() {
        Ok(t) => t,
        Err(e) => return Value::Error(e.to_string()),
    };
    let program = match Parser::new(tokens).parse_program() {
        Ok(p) => p,
        Err(e) => return Value::Error(e.to_string()),
    };
    let mut result = Value::Void;
    for expr in &program {
        result = Expr::interpret(expr, env);
        if let Value::Error(_) = result {
            return result;
        }
    }
    result
}
