use crate::runtime::{Env, Value};

fn chain(args: &[Value], cmp: impl Fn(&Value, &Value) -> bool) -> Value {
    for pair in args.windows(2) {
        if !cmp(&pair[0], &pair[1]) {
            return Value::Boolean(false);
        }
    }
    Value::Boolean(true)
}

/// `(= a b...)`, true if every adjacent pair is numerically/structurally equal.
pub fn eq(args: &[Value], _env: &Env) -> Value {
    chain(args, |a, b| a.equals(b))
}

/// `(< a b...)`, strictly increasing.
pub fn lt(args: &[Value], _env: &Env) -> Value {
    for pair in args.windows(2) {
        match pair[0].lt(&pair[1]) {
            Value::Boolean(b) => {
                if !b {
                    return Value::Boolean(false);
                }
            }
            other => return other,
        }
    }
    Value::Boolean(true)
}

/// `(<= a b...)`.
pub fn le(args: &[Value], _env: &Env) -> Value {
    for pair in args.windows(2) {
        match pair[1].lt(&pair[0]) {
            Value::Boolean(b) => {
                if b {
                    return Value::Boolean(false);
                }
            }
            other => return other,
        }
    }
    Value::Boolean(true)
}

/// `(> a b...)`.
pub fn gt(args: &[Value], _env: &Env) -> Value {
    for pair in args.windows(2) {
        match pair[1].lt(&pair[0]) {
            Value::Boolean(b) => {
                if !b {
                    return Value::Boolean(false);
                }
            }
            other => return other,
        }
    }
    Value::Boolean(true)
}

/// `(>= a b...)`.
pub fn ge(args: &[Value], _env: &Env) -> Value {
    for pair in args.windows(2) {
        match pair[0].lt(&pair[1]) {
            Value::Boolean(b) => {
                if b {
                    return Value::Boolean(false);
                }
            }
            other => return other,
        }
    }
    Value::Boolean(true)
}
