use crate::runtime::{Env, Value};

/// `(cons a b)`.
pub fn cons(args: &[Value], _env: &Env) -> Value {
    Value::Pair(Box::new(args[0].clone()), Box::new(args[1].clone()))
}

/// `(car p)`.
pub fn car(args: &[Value], _env: &Env) -> Value {
    match &args[0] {
        Value::Pair(head, _) => (**head).clone(),
        other => Value::Error(format!(
            "car argument is not a pair (got {})",
            other.type_name()
        )),
    }
}

/// `(cdr p)`.
pub fn cdr(args: &[Value], _env: &Env) -> Value {
    match &args[0] {
        Value::Pair(_, tail) => (**tail).clone(),
        other => Value::Error(format!(
            "cdr argument is not a pair (got {})",
            other.type_name()
        )),
    }
}

/// `(list v...)`, at least zero operands.
pub fn list(args: &[Value], _env: &Env) -> Value {
    Value::list(args.to_vec())
}
