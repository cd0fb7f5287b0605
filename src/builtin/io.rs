use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::runtime::{Env, Value};

/// `(display v...)`, at least one operand. Strings print raw (no quoting);
/// every other value prints its canonical form. Returns `Void`.
pub fn display(args: &[Value], _env: &Env) -> Value {
    let mut out = String::new();
    for v in args {
        match v {
            Value::Str(s) => out.push_str(s),
            other => out.push_str(&other.to_display_string()),
        }
    }
    print!("{out}");
    let _ = std::io::stdout().flush();
    Value::Void
}

/// `(system cmd)` — runs `cmd` through the host shell, returning its exit
/// code (or `-1` if the process could not be spawned).
pub fn system(args: &[Value], _env: &Env) -> Value {
    let cmd = match &args[0] {
        Value::Str(s) => s,
        other => {
            return Value::Error(format!("system: expected a string, got {}", other.type_name()))
        }
    };
    match std::process::Command::new("sh").arg("-c").arg(cmd).status() {
        Ok(status) => Value::Integer(status.code().unwrap_or(-1) as i64),
        Err(_) => Value::Integer(-1),
    }
}

/// `(getchar)` — reads one byte from stdin; `-1` at EOF.
pub fn getchar(_args: &[Value], _env: &Env) -> Value {
    let mut buf = [0u8; 1];
    match std::io::stdin().read(&mut buf) {
        Ok(0) => Value::Integer(-1),
        Ok(_) => Value::Integer(buf[0] as i64),
        Err(_) => Value::Integer(-1),
    }
}

/// `(putchar n)` — writes one byte to stdout.
pub fn putchar(args: &[Value], _env: &Env) -> Value {
    match args[0].as_i64_checked() {
        Some(n) if (0..=255).contains(&n) => {
            let _ = std::io::stdout().write_all(&[n as u8]);
            let _ = std::io::stdout().flush();
            Value::Void
        }
        _ => Value::Error("putchar: expected a byte value (0-255)".to_string()),
    }
}

/// `(current-seconds)`.
pub fn current_seconds(_args: &[Value], _env: &Env) -> Value {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => Value::Integer(d.as_secs() as i64),
        Err(_) => Value::Integer(0),
    }
}
