use crate::runtime::{Env, Value};

/// `(void? v)`.
pub fn is_void(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(args[0], Value::Void))
}

/// `(boolean? v)`.
pub fn is_boolean(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(args[0], Value::Boolean(_)))
}

/// `(integer? v)`.
pub fn is_integer(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(args[0], Value::Integer(_)))
}

/// `(real? v)`.
pub fn is_real(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(args[0], Value::Real(_)))
}

/// `(number? v)` — true for any value on the numeric promotion lattice.
pub fn is_number(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(
        args[0],
        Value::Integer(_) | Value::Real(_) | Value::Rational(..)
    ))
}

/// `(symbol? v)`. The value model has no distinct Symbol variant;
/// identifiers resolve to ordinary values before a predicate could ever see
/// them, so this always reports false.
pub fn is_symbol(args: &[Value], _env: &Env) -> Value {
    let _ = &args[0];
    Value::Boolean(false)
}

/// `(pair? v)`.
pub fn is_pair(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(args[0], Value::Pair(..)))
}

/// `(procedure? v)`.
pub fn is_procedure(args: &[Value], _env: &Env) -> Value {
    Value::Boolean(matches!(args[0], Value::Procedure(..)))
}

/// `(defined? name)` — `name` is a string; true if bound anywhere in `env`'s
/// chain. Does not evaluate the name as an identifier, so an unbound lookup
/// never short-circuits this check.
pub fn is_defined(args: &[Value], env: &Env) -> Value {
    match &args[0] {
        Value::Str(name) => Value::Boolean(env.is_bound(name)),
        other => Value::Error(format!("defined?: expected a string, got {}", other.type_name())),
    }
}

/// `(isfinite x)`.
pub fn is_finite(args: &[Value], _env: &Env) -> Value {
    match args[0].as_f64_checked() {
        Some(f) => Value::Boolean(f.is_finite()),
        None => Value::Error(format!("isfinite: expected a number, got {}", args[0].type_name())),
    }
}

/// `(isinf x)`.
pub fn is_inf(args: &[Value], _env: &Env) -> Value {
    match args[0].as_f64_checked() {
        Some(f) => Value::Boolean(f.is_infinite()),
        None => Value::Error(format!("isinf: expected a number, got {}", args[0].type_name())),
    }
}

/// `(isnan x)`.
pub fn is_nan(args: &[Value], _env: &Env) -> Value {
    match args[0].as_f64_checked() {
        Some(f) => Value::Boolean(f.is_nan()),
        None => Value::Error(format!("isnan: expected a number, got {}", args[0].type_name())),
    }
}

/// `(isnormal x)`.
pub fn is_normal(args: &[Value], _env: &Env) -> Value {
    match args[0].as_f64_checked() {
        Some(f) => Value::Boolean(f.is_normal()),
        None => Value::Error(format!("isnormal: expected a number, got {}", args[0].type_name())),
    }
}
