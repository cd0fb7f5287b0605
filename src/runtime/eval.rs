use std::rc::Rc;

use crate::builtin;
use crate::parser::{Arg, Expr, ExprKind};
use crate::runtime::{Env, Value};

/// Signature every builtin implementation shares: it receives already
/// evaluated arguments and the calling environment (needed by `eval`,
/// `include`, and the macro-time builtins).
pub type BuiltinFn = fn(&[Value], &Env) -> Value;

/// One entry in the static builtin dispatch table.
///
/// Carries two distinct arities, mirroring
/// `original_source/src/builtin/builtin.h`'s `builtin_function` struct,
/// which declares both an `arity`/`variadic` pair *and* a separate
/// `pn_arity` field: direct application (`(+ 1 2 3)`) is governed by
/// `min_arity`/`variadic`, while appearing as an operator inside a PN block
/// (`{+ $1 $2}`) is governed by `pn_arity` alone, independent of whether the
/// builtin is variadic under direct call. Kept separate rather than
/// collapsed into one number since the two call shapes genuinely disagree
/// on how many operands some builtins take.
pub struct BuiltinSpec {
    /// Surface name, e.g. `"+"`, `"car"`, `"strlen"`.
    pub name: &'static str,
    /// Minimum argument count for direct application.
    pub min_arity: usize,
    /// Whether extra arguments beyond `min_arity` are accepted under direct
    /// application.
    pub variadic: bool,
    /// Fixed operand count this builtin consumes when it appears as an
    /// operator inside a PN block's reduction.
    pub pn_arity: usize,
    /// The implementation.
    pub func: BuiltinFn,
}

/// The full builtin roster, grounded per-group in `src/builtin/*`.
pub fn builtins() -> &'static [BuiltinSpec] {
    builtin::TABLE
}

/// Looks up a builtin by name.
pub fn lookup_builtin(name: &str) -> Option<&'static BuiltinSpec> {
    builtins().iter().find(|b| b.name == name)
}

/// Builds the global frame with every builtin pre-bound as a first-class
/// `Procedure` value, so a PN block or `(define f +)` can treat a primitive
/// exactly like a user lambda.
pub fn global_env() -> Env {
    let env = Env::new_global();
    for b in builtins() {
        let node = Expr::synthetic(ExprKind::Builtin(b.name.to_string()));
        env.define_local(b.name.to_string(), Value::Procedure(node, env.clone()));
    }
    env
}

/// Invokes a builtin by name directly, without going through a `Procedure`
/// value wrapper. Used by `Expr::call` for `ExprKind::Builtin` nodes.
pub fn call_builtin_by_name(name: &str, args: &[Value], env: &Env) -> Value {
    match lookup_builtin(name) {
        Some(spec) => (spec.func)(args, env),
        None => Value::Error(format!("unknown builtin: {name}")),
    }
}

/// Applies any callable `Value` to already-evaluated arguments.
pub fn apply_value(callee: &Value, args: &[Value]) -> Value {
    match callee {
        Value::Procedure(expr, captured) => Expr::call(expr, args, captured),
        Value::Error(e) => Value::Error(e.clone()),
        other => Value::Error(format!("not callable: {}", other.type_name())),
    }
}

/// Evaluates `(proc arg...)`: arguments first, `%expr` splices spliced in
/// order, then dispatches to a builtin by name or applies a procedure value.
pub fn eval_call(proc: &Rc<Expr>, args: &[Arg], env: &Env) -> Value {
    let mut evaluated = Vec::with_capacity(args.len());
    for arg in args {
        if arg.expanded {
            let spliced = Expr::interpret(&arg.expr, env);
            if let Value::Error(_) = spliced {
                return spliced;
            }
            match spliced.to_vec() {
                Ok(items) => evaluated.extend(items),
                Err(_) => {
                    return Value::Error(
                        "%expr must evaluate to a proper cons-list".to_string(),
                    )
                }
            }
        } else {
            let v = Expr::interpret(&arg.expr, env);
            if let Value::Error(_) = v {
                return v;
            }
            evaluated.push(v);
        }
    }

    if let ExprKind::Identifier(name) = &proc.kind {
        if let Some(spec) = lookup_builtin(name) {
            if evaluated.len() < spec.min_arity
                || (!spec.variadic && evaluated.len() != spec.min_arity)
            {
                let qualifier = if spec.variadic { "at least " } else { "" };
                return Value::Error(format!(
                    "{name}: expected {qualifier}{} argument(s), got {}",
                    spec.min_arity,
                    evaluated.len()
                ));
            }
            return (spec.func)(&evaluated, env);
        }
    }

    let callee = Expr::interpret(proc, env);
    if let Value::Error(_) = callee {
        return callee;
    }
    if !matches!(callee, Value::Procedure(..)) {
        return Value::Error(format!(
            "cannot call value of type {}",
            callee.type_name()
        ));
    }
    apply_value(&callee, &evaluated)
}

/// Runs a PN block's body, grounded in
/// `original_source/src/expressions/polish.c`.
///
/// Evaluates each body expression left to right into a "waiting" stack,
/// then reduces it into a "computed" stack: popping from the end of
/// `waiting`, plain values go straight onto `computed`; a `Procedure`
/// consumes its arguments first from the top of `computed` and, once that
/// runs short, from the `$1..` positionals in order, then pushes its
/// result back onto `computed`. Exactly one leftover value is the block's
/// result.
pub fn interpret_pn_body(body: &[Rc<Expr>], frame: &Env, dollar_args: &[Value]) -> Value {
    let mut waiting = Vec::with_capacity(body.len());
    for expr in body {
        let v = Expr::interpret(expr, frame);
        if let Value::Error(_) = v {
            return v;
        }
        waiting.push(v);
    }

    let mut computed: Vec<Value> = Vec::new();
    let mut dollar_cursor = 0usize;

    while let Some(v) = waiting.pop() {
        match v {
            Value::Procedure(expr, captured) => {
                let arity = Expr::pn_arity(&expr).unwrap_or(1);
                let mut from_computed = Vec::with_capacity(arity);
                while from_computed.len() < arity {
                    if let Some(c) = computed.pop() {
                        from_computed.push(c);
                    } else {
                        break;
                    }
                }
                let needed_from_dollar = arity - from_computed.len();
                let mut args = Vec::with_capacity(arity);
                for _ in 0..needed_from_dollar {
                    if dollar_cursor >= dollar_args.len() {
                        break;
                    }
                    args.push(dollar_args[dollar_cursor].clone());
                    dollar_cursor += 1;
                }
                args.extend(from_computed);
                let result = Expr::call(&expr, &args, &captured);
                if let Value::Error(_) = result {
                    return result;
                }
                computed.push(result);
            }
            other => computed.push(other),
        }
    }

    match computed.len() {
        1 => computed.pop().unwrap(),
        0 => Value::Error("PN block yields no value".to_string()),
        _ => Value::Error("PN block yields multiple values".to_string()),
    }
}
