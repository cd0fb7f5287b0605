use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::lexer::Token;
use crate::parser::Expr;
use crate::runtime::Env;

/// A live token stream handed to macro-time builtins.
///
/// Nothing in the parser or scanner ever constructs a [`Value::Internal`]
/// from surface syntax; the variant and its three builtins
/// (`peek-tkn`/`pop-tkn`/`parse`) exist for completeness of the builtin
/// roster but have no reachable construction path outside their own
/// implementations.
#[derive(Debug)]
pub struct TokenStream {
    /// Remaining tokens, in order.
    pub tokens: Vec<Token>,
    /// Index of the next unread token.
    pub position: usize,
}

impl TokenStream {
    /// Returns the next unread token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the next token.
    pub fn pop(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.position).cloned();
        if tok.is_some() {
            self.position += 1;
        }
        tok
    }
}

/// A runtime value.
///
/// Unsupported operations return [`Value::Error`] instead of panicking or
/// propagating a Rust `Result` — errors are ordinary values in this
/// language, and the evaluator is responsible for short-circuiting on them.
#[derive(Debug, Clone)]
pub enum Value {
    /// The result of a side-effecting form that produces nothing
    /// meaningful (e.g. `define`).
    Void,
    /// The empty list / "nil".
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Real(f64),
    /// Exact rational, always stored in lowest terms with a positive
    /// denominator.
    Rational(i64, i64),
    /// UTF-8 string. Raw bytes; quoting is added only by `to_display_string`.
    Str(String),
    /// Cons cell. `Null` terminates a proper list.
    Pair(Box<Value>, Box<Value>),
    /// A callable: the expression that implements the call, plus the
    /// environment frame captured when the procedure value was created.
    Procedure(Rc<Expr>, Env),
    /// Opaque token-stream handle used only inside macro-time builtins.
    Internal(Rc<RefCell<TokenStream>>),
    /// An error value carrying a human-readable message.
    Error(String),
}

impl Value {
    /// Convenience constructor for a reduced rational; falls back to
    /// `Integer` when the fraction reduces to a whole number.
    pub fn rational(numerator: i64, denominator: i64) -> Value {
        if denominator == 0 {
            return Value::Error("division by zero".to_string());
        }
        let (mut n, mut d) = (numerator, denominator);
        if d < 0 {
            n = -n;
            d = -d;
        }
        let g = gcd(n.unsigned_abs(), d.unsigned_abs()).max(1);
        let (n, d) = (n / g as i64, d / g as i64);
        if d == 1 {
            Value::Integer(n)
        } else {
            Value::Rational(n, d)
        }
    }

    /// Builds a proper cons-list from a vector of values.
    pub fn list(values: Vec<Value>) -> Value {
        let mut result = Value::Null;
        for v in values.into_iter().rev() {
            result = Value::Pair(Box::new(v), Box::new(result));
        }
        result
    }

    /// Converts a proper cons-list into a vector; errors if `self` is not
    /// a proper list (every tail must eventually reach `Null`).
    pub fn to_vec(&self) -> Result<Vec<Value>, Value> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                Value::Null => return Ok(out),
                Value::Pair(head, tail) => {
                    out.push((**head).clone());
                    cur = tail;
                }
                _ => return Err(Value::Error("not a proper list".to_string())),
            }
        }
    }

    /// True for every value except `Boolean(false)` — matches the source's
    /// "everything but false is truthy in host contexts that need a plain
    /// bool" convention; the language itself requires `Boolean` for `if`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    /// Short, user-facing type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Rational(..) => "rational",
            Value::Str(_) => "string",
            Value::Pair(..) => "pair",
            Value::Procedure(..) => "procedure",
            Value::Internal(_) => "internal",
            Value::Error(_) => "error",
        }
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            Value::Integer(_) => Some(0),
            Value::Rational(..) => Some(1),
            Value::Real(_) => Some(2),
            _ => None,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Value::Integer(n) => *n as f64,
            Value::Rational(n, d) => *n as f64 / *d as f64,
            Value::Real(r) => *r,
            _ => f64::NAN,
        }
    }

    fn type_error(op: &str, a: &Value, b: &Value) -> Value {
        Value::Error(format!(
            "{op}: unsupported operand types {} and {}",
            a.type_name(),
            b.type_name()
        ))
    }

    /// `+`
    pub fn add(&self, other: &Value) -> Value {
        self.numeric_op("+", other, |a, b| a.wrapping_add(b), |a, b| a + b, |n1, d1, n2, d2| {
            Value::rational(n1 * d2 + n2 * d1, d1 * d2)
        })
    }

    /// `-`
    pub fn sub(&self, other: &Value) -> Value {
        self.numeric_op("-", other, |a, b| a.wrapping_sub(b), |a, b| a - b, |n1, d1, n2, d2| {
            Value::rational(n1 * d2 - n2 * d1, d1 * d2)
        })
    }

    /// `*`
    pub fn mul(&self, other: &Value) -> Value {
        self.numeric_op("*", other, |a, b| a.wrapping_mul(b), |a, b| a * b, |n1, d1, n2, d2| {
            Value::rational(n1 * n2, d1 * d2)
        })
    }

    /// `/`. Integer division that does not divide evenly promotes to
    /// Rational; division by zero is an Error.
    pub fn div(&self, other: &Value) -> Value {
        let (Some(ra), Some(rb)) = (self.numeric_rank(), other.numeric_rank()) else {
            return Value::type_error("/", self, other);
        };
        let rank = ra.max(rb);
        match rank {
            0 => {
                let (a, b) = (self.as_i64(), other.as_i64());
                if b == 0 {
                    return Value::Error("division by zero".to_string());
                }
                Value::rational(a, b)
            }
            1 => {
                let (n1, d1) = self.as_rational();
                let (n2, d2) = other.as_rational();
                if n2 == 0 {
                    return Value::Error("division by zero".to_string());
                }
                Value::rational(n1 * d2, d1 * n2)
            }
            _ => {
                let b = other.as_f64();
                if b == 0.0 {
                    return Value::Error("division by zero".to_string());
                }
                Value::Real(self.as_f64() / b)
            }
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            Value::Integer(n) => *n,
            _ => 0,
        }
    }

    /// Public numeric coercion used by the math builtins: any numeric value
    /// as an `f64`, or `None` if `self` is not numeric.
    pub fn as_f64_checked(&self) -> Option<f64> {
        self.numeric_rank().map(|_| self.as_f64())
    }

    /// Public numeric coercion used by builtins that require a whole
    /// number (e.g. string indices, tape heads): `None` unless `self` is
    /// exactly `Integer`.
    pub fn as_i64_checked(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    fn as_rational(&self) -> (i64, i64) {
        match self {
            Value::Integer(n) => (*n, 1),
            Value::Rational(n, d) => (*n, *d),
            _ => (0, 1),
        }
    }

    fn numeric_op(
        &self,
        op: &str,
        other: &Value,
        int_op: impl Fn(i64, i64) -> i64,
        real_op: impl Fn(f64, f64) -> f64,
        rat_op: impl Fn(i64, i64, i64, i64) -> Value,
    ) -> Value {
        let (Some(ra), Some(rb)) = (self.numeric_rank(), other.numeric_rank()) else {
            return Value::type_error(op, self, other);
        };
        match ra.max(rb) {
            0 => Value::Integer(int_op(self.as_i64(), other.as_i64())),
            1 => {
                let (n1, d1) = self.as_rational();
                let (n2, d2) = other.as_rational();
                rat_op(n1, d1, n2, d2)
            }
            _ => Value::Real(real_op(self.as_f64(), other.as_f64())),
        }
    }

    /// `<`
    pub fn lt(&self, other: &Value) -> Value {
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(_), Some(_)) => Value::Boolean(self.as_f64() < other.as_f64()),
            _ => Value::type_error("<", self, other),
        }
    }

    /// Structural/numeric equality; numbers compare across the promotion
    /// lattice (`Integer 3` equals `Real 3.0` equals `Rational 3/1`).
    pub fn equals(&self, other: &Value) -> bool {
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(_), Some(_)) => self.as_f64() == other.as_f64(),
            _ => match (self, other) {
                (Value::Void, Value::Void) => true,
                (Value::Null, Value::Null) => true,
                (Value::Boolean(a), Value::Boolean(b)) => a == b,
                (Value::Str(a), Value::Str(b)) => a == b,
                (Value::Pair(a1, a2), Value::Pair(b1, b2)) => a1.equals(b1) && a2.equals(b2),
                (Value::Error(a), Value::Error(b)) => a == b,
                _ => false,
            },
        }
    }

    /// `and` — defined only on Booleans.
    pub fn and(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(*a && *b),
            _ => Value::type_error("and", self, other),
        }
    }

    /// `or` — defined only on Booleans.
    pub fn or(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(*a || *b),
            _ => Value::type_error("or", self, other),
        }
    }

    /// `xor` — defined only on Booleans.
    pub fn xor(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(*a != *b),
            _ => Value::type_error("xor", self, other),
        }
    }

    /// `not` — defined only on Booleans.
    pub fn not(&self) -> Value {
        match self {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Error(format!("not: unsupported operand type {}", self.type_name())),
        }
    }

    /// Canonical printed form. Re-scanning it reproduces the value, except
    /// for `Procedure` (prints its lambda source, which need not round-trip
    /// to an identical closure) and `Error` (prints its bare message).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Void => "#<void>".to_string(),
            Value::Null => "()".to_string(),
            Value::Boolean(true) => "#t".to_string(),
            Value::Boolean(false) => "#f".to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Real(r) => format!("{r:.6}"),
            Value::Rational(n, d) => format!("{n}/{d}"),
            Value::Str(s) => format!("\"{s}\""),
            Value::Pair(..) => self.list_display_string(),
            Value::Procedure(expr, _) => Expr::to_string(expr),
            Value::Internal(_) => "#<internal>".to_string(),
            Value::Error(msg) => msg.clone(),
        }
    }

    fn list_display_string(&self) -> String {
        let mut parts = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                Value::Pair(head, tail) => {
                    parts.push(head.to_display_string());
                    cur = tail;
                }
                Value::Null => return format!("({})", parts.join(" ")),
                other => return format!("({} . {})", parts.join(" "), other.to_display_string()),
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_addition_stays_integer() {
        assert!(matches!(Value::Integer(1).add(&Value::Integer(2)), Value::Integer(3)));
    }

    #[test]
    fn mixed_integer_real_promotes_to_real() {
        match Value::Integer(1).add(&Value::Real(2.5)) {
            Value::Real(r) => assert!((r - 3.5).abs() < f64::EPSILON),
            other => panic!("expected Real, got {other:?}"),
        }
    }

    #[test]
    fn integer_division_not_evenly_divisible_yields_rational() {
        match Value::Integer(7).div(&Value::Integer(4)) {
            Value::Rational(7, 4) => {}
            other => panic!("expected Rational(7, 4), got {other:?}"),
        }
    }

    #[test]
    fn integer_division_evenly_divisible_yields_integer() {
        assert!(matches!(Value::Integer(8).div(&Value::Integer(4)), Value::Integer(2)));
    }

    #[test]
    fn division_by_zero_is_an_error_value() {
        assert!(matches!(Value::Integer(1).div(&Value::Integer(0)), Value::Error(_)));
    }

    #[test]
    fn numeric_equality_crosses_the_promotion_lattice() {
        assert!(Value::Integer(3).equals(&Value::Real(3.0)));
        assert!(Value::Integer(3).equals(&Value::Rational(3, 1)));
    }

    #[test]
    fn rational_reduces_to_lowest_terms() {
        match Value::rational(4, 8) {
            Value::Integer(n) => assert_eq!(n, 1),
            other => panic!("expected reduction to Integer(1), got {other:?}"),
        }
        match Value::rational(6, 8) {
            Value::Rational(3, 4) => {}
            other => panic!("expected Rational(3, 4), got {other:?}"),
        }
    }

    #[test]
    fn logic_ops_reject_non_booleans() {
        assert!(matches!(Value::Integer(1).and(&Value::Boolean(true)), Value::Error(_)));
    }

    #[test]
    fn list_round_trips_through_vec() {
        let list = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let back = list.to_vec().unwrap();
        assert_eq!(back.len(), 3);
        assert!(back[0].equals(&Value::Integer(1)));
    }
}
