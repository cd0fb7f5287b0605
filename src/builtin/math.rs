use rand::Rng;

use crate::runtime::{Env, Value};

fn expect_f64(name: &str, v: &Value) -> Result<f64, Value> {
    v.as_f64_checked()
        .ok_or_else(|| Value::Error(format!("{name}: expected a number, got {}", v.type_name())))
}

macro_rules! unary_math {
    ($fn_name:ident, $builtin:expr, $op:expr) => {
        pub fn $fn_name(args: &[Value], _env: &Env) -> Value {
            match expect_f64($builtin, &args[0]) {
                Ok(x) => Value::Real($op(x)),
                Err(e) => e,
            }
        }
    };
}

unary_math!(sin, "sin", f64::sin);
unary_math!(cos, "cos", f64::cos);
unary_math!(tan, "tan", f64::tan);
unary_math!(asin, "asin", f64::asin);
unary_math!(acos, "acos", f64::acos);
unary_math!(atan, "atan", f64::atan);
unary_math!(sinh, "sinh", f64::sinh);
unary_math!(cosh, "cosh", f64::cosh);
unary_math!(tanh, "tanh", f64::tanh);
unary_math!(exp, "exp", f64::exp);
unary_math!(log, "log", f64::ln);
unary_math!(sqrt, "sqrt", f64::sqrt);
unary_math!(cbrt, "cbrt", f64::cbrt);
unary_math!(floor, "floor", f64::floor);
unary_math!(ceil, "ceil", f64::ceil);
unary_math!(round, "round", f64::round);
unary_math!(truncate, "truncate", f64::trunc);

/// `(pow base exp)`.
pub fn pow(args: &[Value], _env: &Env) -> Value {
    match (expect_f64("pow", &args[0]), expect_f64("pow", &args[1])) {
        (Ok(b), Ok(e)) => Value::Real(b.powf(e)),
        (Err(e), _) | (_, Err(e)) => e,
    }
}

/// `(hypot a b)`.
pub fn hypot(args: &[Value], _env: &Env) -> Value {
    match (expect_f64("hypot", &args[0]), expect_f64("hypot", &args[1])) {
        (Ok(a), Ok(b)) => Value::Real(a.hypot(b)),
        (Err(e), _) | (_, Err(e)) => e,
    }
}

/// `(atan2 y x)`.
pub fn atan2(args: &[Value], _env: &Env) -> Value {
    match (expect_f64("atan2", &args[0]), expect_f64("atan2", &args[1])) {
        (Ok(y), Ok(x)) => Value::Real(y.atan2(x)),
        (Err(e), _) | (_, Err(e)) => e,
    }
}

/// `(erf x)`, Abramowitz & Stegun 7.1.26 approximation (max error ~1.5e-7).
/// No std or pack-grounded crate exposes this; hand-derived.
pub fn erf(args: &[Value], _env: &Env) -> Value {
    match expect_f64("erf", &args[0]) {
        Ok(x) => Value::Real(erf_approx(x)),
        Err(e) => e,
    }
}

fn erf_approx(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// `(gamma x)`, Lanczos approximation (g=7, n=9 coefficients).
pub fn gamma(args: &[Value], _env: &Env) -> Value {
    match expect_f64("gamma", &args[0]) {
        Ok(x) => Value::Real(gamma_approx(x)),
        Err(e) => e,
    }
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

fn gamma_approx(x: f64) -> f64 {
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma_approx(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = LANCZOS_COEFFICIENTS[0];
        let t = x + LANCZOS_G + 0.5;
        for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}

/// `(random)` in `[0, 1)`; `(random n)` an integer in `[0, n)`.
pub fn random(args: &[Value], _env: &Env) -> Value {
    let mut rng = rand::thread_rng();
    if args.is_empty() {
        return Value::Real(rng.gen::<f64>());
    }
    match args[0].as_i64_checked() {
        Some(n) if n > 0 => Value::Integer(rng.gen_range(0..n)),
        Some(_) => Value::Error("random: upper bound must be positive".to_string()),
        None => Value::Error(format!(
            "random: expected an integer, got {}",
            args[0].type_name()
        )),
    }
}
