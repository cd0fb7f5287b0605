use crate::runtime::{Env, Value};

fn expect_str<'a>(name: &str, v: &'a Value) -> Result<&'a str, Value> {
    match v {
        Value::Str(s) => Ok(s),
        other => Err(Value::Error(format!(
            "{name}: expected a string, got {}",
            other.type_name()
        ))),
    }
}

fn expect_index(name: &str, v: &Value) -> Result<usize, Value> {
    match v.as_i64_checked() {
        Some(n) if n >= 0 => Ok(n as usize),
        Some(_) => Err(Value::Error(format!("{name}: index must be non-negative"))),
        None => Err(Value::Error(format!(
            "{name}: expected an integer index, got {}",
            v.type_name()
        ))),
    }
}

/// `(strlen s)`, counted in characters.
pub fn strlen(args: &[Value], _env: &Env) -> Value {
    match expect_str("strlen", &args[0]) {
        Ok(s) => Value::Integer(s.chars().count() as i64),
        Err(e) => e,
    }
}

/// `(strcat s...)`, at least one operand.
pub fn strcat(args: &[Value], _env: &Env) -> Value {
    let mut out = String::new();
    for a in args {
        match expect_str("strcat", a) {
            Ok(s) => out.push_str(s),
            Err(e) => return e,
        }
    }
    Value::Str(out)
}

/// `(charat s i)` — the single character at index `i` as a one-character
/// string.
pub fn charat(args: &[Value], _env: &Env) -> Value {
    let s = match expect_str("charat", &args[0]) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let i = match expect_index("charat", &args[1]) {
        Ok(i) => i,
        Err(e) => return e,
    };
    match s.chars().nth(i) {
        Some(c) => Value::Str(c.to_string()),
        None => Value::Error(format!("charat: index {i} out of range")),
    }
}

/// `(substr s start len)`.
pub fn substr(args: &[Value], _env: &Env) -> Value {
    let s = match expect_str("substr", &args[0]) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let start = match expect_index("substr", &args[1]) {
        Ok(i) => i,
        Err(e) => return e,
    };
    let len = match expect_index("substr", &args[2]) {
        Ok(i) => i,
        Err(e) => return e,
    };
    let chars: Vec<char> = s.chars().collect();
    if start > chars.len() || start + len > chars.len() {
        return Value::Error("substr: range out of bounds".to_string());
    }
    Value::Str(chars[start..start + len].iter().collect())
}

/// `(strcar s)` — the first character, mirroring `car` for lists.
pub fn strcar(args: &[Value], _env: &Env) -> Value {
    let s = match expect_str("strcar", &args[0]) {
        Ok(s) => s,
        Err(e) => return e,
    };
    match s.chars().next() {
        Some(c) => Value::Str(c.to_string()),
        None => Value::Error("strcar: empty string".to_string()),
    }
}

/// `(strcdr s)` — every character after the first, mirroring `cdr`.
pub fn strcdr(args: &[Value], _env: &Env) -> Value {
    let s = match expect_str("strcdr", &args[0]) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let mut chars = s.chars();
    if chars.next().is_none() {
        return Value::Error("strcdr: empty string".to_string());
    }
    Value::Str(chars.collect())
}
