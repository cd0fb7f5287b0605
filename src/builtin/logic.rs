use crate::runtime::{Env, Value};

/// `(and b...)`, at least zero operands; empty call is `#t`.
pub fn and(args: &[Value], _env: &Env) -> Value {
    let mut acc = Value::Boolean(true);
    for a in args {
        acc = acc.and(a);
        if let Value::Error(_) = acc {
            return acc;
        }
    }
    acc
}

/// `(or b...)`, at least zero operands; empty call is `#f`.
pub fn or(args: &[Value], _env: &Env) -> Value {
    let mut acc = Value::Boolean(false);
    for a in args {
        acc = acc.or(a);
        if let Value::Error(_) = acc {
            return acc;
        }
    }
    acc
}

/// `(xor b...)`, at least zero operands; empty call is `#f`.
pub fn xor(args: &[Value], _env: &Env) -> Value {
    let mut acc = Value::Boolean(false);
    for a in args {
        acc = acc.xor(a);
        if let Value::Error(_) = acc {
            return acc;
        }
    }
    acc
}

/// `(not b)`.
pub fn not(args: &[Value], _env: &Env) -> Value {
    args[0].not()
}
