use std::cell::RefCell;
use std::rc::Rc;

use crate::parser::{Expr, Parser};
use crate::runtime::{Env, TokenStream, Value};

fn expect_internal<'a>(name: &str, v: &'a Value) -> Result<&'a Rc<RefCell<TokenStream>>, Value> {
    match v {
        Value::Internal(handle) => Ok(handle),
        other => Err(Value::Error(format!(
            "{name}: expected an internal token-stream value, got {}",
            other.type_name()
        ))),
    }
}

/// `(peek-tkn internal)` — the lexeme of the next unconsumed token, or
/// `Null` at end of stream.
pub fn peek_tkn(args: &[Value], _env: &Env) -> Value {
    let handle = match expect_internal("peek-tkn", &args[0]) {
        Ok(h) => h,
        Err(e) => return e,
    };
    match handle.borrow().peek() {
        Some(tok) => Value::Str(tok.lexeme.clone()),
        None => Value::Null,
    }
}

/// `(pop-tkn internal)` — consumes and returns the next token's lexeme, or
/// `Null` at end of stream.
pub fn pop_tkn(args: &[Value], _env: &Env) -> Value {
    let handle = match expect_internal("pop-tkn", &args[0]) {
        Ok(h) => h,
        Err(e) => return e,
    };
    match handle.borrow_mut().pop() {
        Some(tok) => Value::Str(tok.lexeme),
        None => Value::Null,
    }
}

/// `(parse internal)` — parses and immediately interprets the next
/// expression from the stream, advancing past the tokens it consumed.
pub fn parse(args: &[Value], env: &Env) -> Value {
    let handle = match expect_internal("parse", &args[0]) {
        Ok(h) => h,
        Err(e) => return e,
    };
    let remaining: Vec<_> = {
        let stream = handle.borrow();
        stream.tokens[stream.position..].to_vec()
    };
    let mut parser = Parser::new(remaining);
    let expr = match parser.parse_one() {
        Ok(e) => e,
        Err(e) => return Value::Error(e.to_string()),
    };
    handle.borrow_mut().position += parser.consumed();
    Expr::interpret(&expr, env)
}
