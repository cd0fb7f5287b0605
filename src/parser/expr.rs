use std::cell::RefCell;
use std::rc::Rc;

use crate::automaton::{AutomatonState, CompiledAutomaton};
use crate::runtime::eval;
use crate::runtime::{Env, Value};

/// One parsed expression node. Carries source position for
/// diagnostics; the node itself is otherwise immutable after parsing, save
/// for the automaton's one-shot compilation cache.
#[derive(Debug)]
pub struct Expr {
    /// Line the expression starts on (1-indexed).
    pub line: usize,
    /// Column the expression starts on (1-indexed).
    pub column: usize,
    /// The expression's shape.
    pub kind: ExprKind,
}

/// An evaluation-form argument, tagged with whether it was written as
/// `%expr` (expanded: splice a cons-list's elements into the call).
#[derive(Debug)]
pub struct Arg {
    /// The argument expression.
    pub expr: Rc<Expr>,
    /// Whether this argument should be spliced rather than passed whole.
    pub expanded: bool,
}

/// The thirteen expression shapes of Theory Lisp's surface syntax, plus the
/// internal `Builtin` leaf used to make primitives first-class values.
#[derive(Debug)]
pub enum ExprKind {
    /// A literal value embedded directly in the tree.
    DataLiteral(Value),
    /// A variable reference.
    Identifier(String),
    /// `(if cond then else)`.
    If {
        cond: Rc<Expr>,
        then_branch: Rc<Expr>,
        else_branch: Rc<Expr>,
    },
    /// `(cond (test result)...)`. Void if nothing matches.
    Cond(Vec<(Rc<Expr>, Rc<Expr>)>),
    /// `(let ((name value)...) body...)`. Sequential: later bindings see
    /// earlier ones.
    Let {
        bindings: Vec<(String, Rc<Expr>)>,
        body: Vec<Rc<Expr>>,
    },
    /// `(define name value)`. Always writes to the global frame.
    Definition { name: String, value: Rc<Expr> },
    /// `(set! name value)`. Writes to the current frame only.
    Set { name: String, value: Rc<Expr> },
    /// `(lambda [captures] (params...) body)`.
    Lambda {
        params: Vec<String>,
        variadic: bool,
        pn_arity: usize,
        captures: Vec<String>,
        body: Rc<Expr>,
    },
    /// `{[captures] e1 e2 ...}` PN block.
    PnBlock {
        captures: Vec<String>,
        body: Vec<Rc<Expr>>,
    },
    /// `(proc arg...)`.
    Evaluation { proc: Rc<Expr>, args: Vec<Arg> },
    /// `%expr` used outside an evaluation argument position is an error;
    /// inside one it is unwrapped by the evaluator before reaching here.
    Expanded(Rc<Expr>),
    /// `(try body (catch (name) handler))`.
    TryCatch {
        body: Rc<Expr>,
        exception_name: String,
        handler: Rc<Expr>,
    },
    /// `(automaton [captures] (tape...) state...)`.
    Automaton {
        number_of_tapes: usize,
        captures: Vec<String>,
        states: Vec<AutomatonState>,
        compiled: RefCell<Option<Rc<CompiledAutomaton>>>,
    },
    /// A primitive function, exposed as an ordinary value so it can be
    /// passed around (stored in `$1..`, captured by a PN block, etc.).
    Builtin(String),
}

impl Expr {
    /// Builds a node at the given position, already behind the `Rc` every
    /// call site needs (a `Procedure` value shares this exact pointer, so
    /// the automaton compile cache and closure identity stay coherent).
    pub fn new(line: usize, column: usize, kind: ExprKind) -> Rc<Expr> {
        Rc::new(Expr { line, column, kind })
    }

    /// Builds a position-less node for internally synthesized expressions
    /// (builtin wrappers, desugared forms).
    pub fn synthetic(kind: ExprKind) -> Rc<Expr> {
        Rc::new(Expr { line: 0, column: 0, kind })
    }

    /// Evaluates this node in `env`, returning its value. Never panics on
    /// user-reachable error paths — failures are returned as `Value::Error`.
    pub fn interpret(self_rc: &Rc<Expr>, env: &Env) -> Value {
        match &self_rc.kind {
            ExprKind::DataLiteral(v) => v.clone(),
            ExprKind::Identifier(name) => match env.get(name) {
                Some(v) => v,
                None => Value::Error(format!("unbound identifier: {name}")),
            },
            ExprKind::If { cond, then_branch, else_branch } => match Expr::interpret(cond, env) {
                Value::Error(e) => Value::Error(e),
                Value::Boolean(true) => Expr::interpret(then_branch, env),
                Value::Boolean(false) => Expr::interpret(else_branch, env),
                other => Value::Error(format!(
                    "if: condition must be boolean, got {}",
                    other.type_name()
                )),
            },
            ExprKind::Cond(clauses) => {
                for (test, result) in clauses {
                    match Expr::interpret(test, env) {
                        Value::Error(e) => return Value::Error(e),
                        Value::Boolean(true) => return Expr::interpret(result, env),
                        Value::Boolean(false) => continue,
                        other => {
                            return Value::Error(format!(
                                "cond: condition must be boolean, got {}",
                                other.type_name()
                            ))
                        }
                    }
                }
                Value::Void
            }
            ExprKind::Let { bindings, body } => {
                let frame = env.child();
                for (name, value_expr) in bindings {
                    let v = Expr::interpret(value_expr, &frame);
                    if let Value::Error(_) = v {
                        return v;
                    }
                    frame.define_local(name.clone(), v);
                }
                interpret_body(body, &frame)
            }
            ExprKind::Definition { name, value } => {
                let v = Expr::interpret(value, env);
                if let Value::Error(e) = v {
                    return Value::Error(e);
                }
                env.define_global(name.clone(), v);
                Value::Void
            }
            ExprKind::Set { name, value } => {
                let v = Expr::interpret(value, env);
                if let Value::Error(_) = v {
                    return v;
                }
                env.set_local_or_create(name.clone(), v.clone());
                v
            }
            ExprKind::Lambda { captures, .. } => {
                Value::Procedure(self_rc.clone(), snapshot_captures(captures, env))
            }
            ExprKind::PnBlock { captures, .. } => {
                Value::Procedure(self_rc.clone(), snapshot_captures(captures, env))
            }
            ExprKind::Automaton { captures, .. } => {
                Value::Procedure(self_rc.clone(), snapshot_captures(captures, env))
            }
            ExprKind::Builtin(_) => Value::Procedure(self_rc.clone(), env.clone()),
            ExprKind::Evaluation { proc, args } => eval::eval_call(proc, args, env),
            ExprKind::Expanded(_) => {
                Value::Error("%expr is only valid as a call argument".to_string())
            }
            ExprKind::TryCatch { body, exception_name, handler } => {
                match Expr::interpret(body, env) {
                    Value::Error(message) => {
                        let frame = env.child();
                        frame.define_local(exception_name.clone(), Value::Str(message));
                        Expr::interpret(handler, &frame)
                    }
                    other => other,
                }
            }
        }
    }

    /// Invokes this node as the body of a `Procedure` value. `env` is the
    /// procedure's captured frame.
    pub fn call(self_rc: &Rc<Expr>, args: &[Value], env: &Env) -> Value {
        match &self_rc.kind {
            ExprKind::Lambda { params, variadic, body, .. } => {
                if *variadic {
                    if args.len() < params.len() {
                        return Value::Error(format!(
                            "lambda: expected at least {} argument(s), got {}",
                            params.len(),
                            args.len()
                        ));
                    }
                } else if args.len() != params.len() {
                    return Value::Error(format!(
                        "lambda: expected {} argument(s), got {}",
                        params.len(),
                        args.len()
                    ));
                }
                let call_frame = env.child();
                for (name, value) in params.iter().zip(args.iter()) {
                    call_frame.define_local(name.clone(), value.clone());
                }
                if *variadic {
                    let rest = Value::list(args[params.len()..].to_vec());
                    call_frame.define_local("va_args", rest);
                }
                Expr::interpret(body, &call_frame)
            }
            ExprKind::PnBlock { body, .. } => {
                let call_frame = env.child();
                for (i, value) in args.iter().enumerate() {
                    call_frame.define_local(format!("${}", i + 1), value.clone());
                }
                eval::interpret_pn_body(body, &call_frame, args)
            }
            ExprKind::Automaton { number_of_tapes, states, compiled, .. } => {
                crate::automaton::run(*number_of_tapes, states, compiled, args, env)
            }
            ExprKind::Builtin(name) => eval::call_builtin_by_name(name, args, env),
            _ => Value::Error("call: value is not callable".to_string()),
        }
    }

    /// Caller-visible PN arity: explicit `\N` if given, else the parameter
    /// count (matches `lambda.c`'s arity/pn_arity parity check).
    pub fn pn_arity(self_rc: &Rc<Expr>) -> Option<usize> {
        match &self_rc.kind {
            ExprKind::Lambda { pn_arity, .. } => Some(*pn_arity),
            ExprKind::Builtin(name) => eval::lookup_builtin(name).map(|b| b.pn_arity),
            _ => None,
        }
    }

    /// Reconstructs Theory Lisp surface syntax for this node. Used by the
    /// CLI's `-v` tracing and as a `Procedure`'s printed form, which is its
    /// lambda source rather than an opaque placeholder.
    pub fn to_string(self_rc: &Rc<Expr>) -> String {
        match &self_rc.kind {
            ExprKind::DataLiteral(v) => v.to_display_string(),
            ExprKind::Identifier(name) => name.clone(),
            ExprKind::If { cond, then_branch, else_branch } => format!(
                "(if {} {} {})",
                Expr::to_string(cond),
                Expr::to_string(then_branch),
                Expr::to_string(else_branch)
            ),
            ExprKind::Cond(clauses) => {
                let body: Vec<String> = clauses
                    .iter()
                    .map(|(test, result)| format!("({} {})", Expr::to_string(test), Expr::to_string(result)))
                    .collect();
                format!("(cond {})", body.join(" "))
            }
            ExprKind::Let { bindings, body } => {
                let binds: Vec<String> = bindings
                    .iter()
                    .map(|(name, value)| format!("({} {})", name, Expr::to_string(value)))
                    .collect();
                let body_str: Vec<String> = body.iter().map(Expr::to_string).collect();
                format!("(let ({}) {})", binds.join(" "), body_str.join(" "))
            }
            ExprKind::Definition { name, value } => {
                format!("(define {} {})", name, Expr::to_string(value))
            }
            ExprKind::Set { name, value } => format!("(set! {} {})", name, Expr::to_string(value)),
            ExprKind::Lambda { params, variadic, pn_arity, captures, body } => {
                let mut s = "(lambda".to_string();
                if *pn_arity != params.len() {
                    s.push_str(&format!(" \\{pn_arity}"));
                }
                if !captures.is_empty() {
                    s.push_str(&format!(" [{}]", captures.join(" ")));
                }
                s.push_str(&format!(" ({}", params.join(" ")));
                if *variadic {
                    s.push_str(" .");
                }
                s.push_str(&format!(") {})", Expr::to_string(body)));
                s
            }
            ExprKind::PnBlock { captures, body } => {
                let mut s = "{".to_string();
                if !captures.is_empty() {
                    s.push_str(&format!("[{}] ", captures.join(" ")));
                }
                let parts: Vec<String> = body.iter().map(Expr::to_string).collect();
                s.push_str(&parts.join(" "));
                s.push('}');
                s
            }
            ExprKind::Evaluation { proc, args } => {
                let mut parts = vec![Expr::to_string(proc)];
                for arg in args {
                    let rendered = Expr::to_string(&arg.expr);
                    parts.push(if arg.expanded { format!("%{rendered}") } else { rendered });
                }
                format!("({})", parts.join(" "))
            }
            ExprKind::Expanded(inner) => format!("%{}", Expr::to_string(inner)),
            ExprKind::TryCatch { body, exception_name, handler } => format!(
                "(try {} (catch ({}) {}))",
                Expr::to_string(body),
                exception_name,
                Expr::to_string(handler)
            ),
            ExprKind::Automaton { number_of_tapes, captures, states, .. } => {
                let mut s = format!("(automaton \\{number_of_tapes}");
                if !captures.is_empty() {
                    s.push_str(&format!(" [{}]", captures.join(" ")));
                }
                for state in states {
                    s.push(' ');
                    s.push_str(&state.to_source());
                }
                s.push(')');
                s
            }
            ExprKind::Builtin(name) => name.clone(),
        }
    }
}

/// Builds the frame a `Procedure` value carries: the listed captures are
/// deep-copied at this moment (a by-value copy, not a live reference), but
/// the frame's parent is the live global root, so that free variables *not*
/// in the capture list still resolve against the global frame at call time,
/// including names `define`d after this closure was created.
fn snapshot_captures(captures: &[String], env: &Env) -> Env {
    let frame = env.root().child();
    for name in captures {
        if let Some(v) = env.get(name) {
            frame.define_local(name.clone(), v);
        }
    }
    frame
}

fn interpret_body(body: &[Rc<Expr>], env: &Env) -> Value {
    let mut last = Value::Void;
    for expr in body {
        last = Expr::interpret(expr, env);
        if let Value::Error(_) = last {
            return last;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::eval::global_env;

    fn lit(v: Value) -> Rc<Expr> {
        Expr::synthetic(ExprKind::DataLiteral(v))
    }

    #[test]
    fn if_picks_branch() {
        let env = global_env();
        let node = Expr::synthetic(ExprKind::If {
            cond: lit(Value::Boolean(true)),
            then_branch: lit(Value::Integer(1)),
            else_branch: lit(Value::Integer(2)),
        });
        assert!(Expr::interpret(&node, &env).equals(&Value::Integer(1)));
    }

    #[test]
    fn let_bindings_are_sequential() {
        let env = global_env();
        let node = Expr::synthetic(ExprKind::Let {
            bindings: vec![
                ("x".to_string(), lit(Value::Integer(1))),
                (
                    "y".to_string(),
                    Expr::synthetic(ExprKind::Identifier("x".to_string())),
                ),
            ],
            body: vec![Expr::synthetic(ExprKind::Identifier("y".to_string()))],
        });
        assert!(Expr::interpret(&node, &env).equals(&Value::Integer(1)));
    }

    #[test]
    fn set_without_prior_binding_creates_locally() {
        let env = global_env();
        let node = Expr::synthetic(ExprKind::Set {
            name: "z".to_string(),
            value: lit(Value::Integer(5)),
        });
        let result = Expr::interpret(&node, &env);
        assert!(result.equals(&Value::Integer(5)));
        assert!(env.get("z").unwrap().equals(&Value::Integer(5)));
    }

    #[test]
    fn try_catch_binds_error_message() {
        let env = global_env();
        let node = Expr::synthetic(ExprKind::TryCatch {
            body: Expr::synthetic(ExprKind::Identifier("missing".to_string())),
            exception_name: "e".to_string(),
            handler: Expr::synthetic(ExprKind::Identifier("e".to_string())),
        });
        match Expr::interpret(&node, &env) {
            Value::Str(msg) => assert!(msg.contains("missing")),
            other => panic!("expected Str, got {other:?}"),
        }
    }

    #[test]
    fn lambda_to_string_reconstructs_source() {
        let node = Expr::synthetic(ExprKind::Lambda {
            params: vec!["x".to_string()],
            variadic: false,
            pn_arity: 1,
            captures: vec![],
            body: Expr::synthetic(ExprKind::Identifier("x".to_string())),
        });
        assert_eq!(Expr::to_string(&node), "(lambda (x) x)");
    }

    #[test]
    fn procedure_display_is_its_lambda_source_not_a_placeholder() {
        let env = global_env();
        let lambda = Expr::synthetic(ExprKind::Lambda {
            params: vec![],
            variadic: false,
            pn_arity: 0,
            captures: vec![],
            body: lit(Value::Integer(1)),
        });
        let proc = Value::Procedure(lambda, env);
        assert_eq!(proc.to_display_string(), "(lambda () 1)");
    }
}
