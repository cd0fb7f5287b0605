use crate::runtime::{Env, Value};

fn fold(args: &[Value], identity: Value, op: impl Fn(&Value, &Value) -> Value) -> Value {
    let mut acc = identity;
    for a in args {
        acc = op(&acc, a);
        if let Value::Error(_) = acc {
            return acc;
        }
    }
    acc
}

/// `(+ n...)`, at least zero operands.
pub fn add(args: &[Value], _env: &Env) -> Value {
    fold(args, Value::Integer(0), Value::add)
}

/// `(* n...)`, at least zero operands.
pub fn mul(args: &[Value], _env: &Env) -> Value {
    fold(args, Value::Integer(1), Value::mul)
}

/// `(- n)` negates; `(- n m...)` subtracts the rest from the first.
pub fn sub(args: &[Value], _env: &Env) -> Value {
    if args.len() == 1 {
        return Value::Integer(0).sub(&args[0]);
    }
    let mut acc = args[0].clone();
    for a in &args[1..] {
        acc = acc.sub(a);
        if let Value::Error(_) = acc {
            return acc;
        }
    }
    acc
}

/// `(/ n)` is the reciprocal; `(/ n m...)` divides left to right.
pub fn div(args: &[Value], _env: &Env) -> Value {
    if args.len() == 1 {
        return Value::Integer(1).div(&args[0]);
    }
    let mut acc = args[0].clone();
    for a in &args[1..] {
        acc = acc.div(a);
        if let Value::Error(_) = acc {
            return acc;
        }
    }
    acc
}

/// `(modulo a b)`, defined for integers; `b == 0` is an error.
pub fn modulo(args: &[Value], _env: &Env) -> Value {
    match (&args[0], &args[1]) {
        (Value::Integer(a), Value::Integer(b)) => {
            if *b == 0 {
                Value::Error("modulo: division by zero".to_string())
            } else {
                Value::Integer(a.rem_euclid(*b))
            }
        }
        (a, b) => Value::Error(format!(
            "modulo: unsupported operand types {} and {}",
            a.type_name(),
            b.type_name()
        )),
    }
}
