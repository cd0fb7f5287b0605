//! Multi-tape automaton engine, grounded line-for-line in
//! `original_source/src/automaton/automaton.c` and
//! `original_source/src/expressions/automaton.c`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::parser::Expr;
use crate::runtime::eval::apply_value;
use crate::runtime::{Env, Value};

/// One tape operation applied to a single cell, parsed from `-> <- . expr`.
#[derive(Debug)]
pub enum HeadOp {
    /// `<-`
    MoveLeft,
    /// `->`. If the new head runs past the end of the contents, the tape
    /// is extended with a `Null` cell.
    MoveRight,
    /// A bare expression: evaluate and overwrite the current cell.
    Write(Rc<Expr>),
    /// `.`
    Nop,
}

/// The special next-state names resolved at compile time.
#[derive(Debug)]
pub enum NextStateName {
    SelfState,
    Next,
    Halt,
    Accept,
    Reject,
    Named(String),
}

/// One transition out of a state.
#[derive(Debug)]
pub struct Transition {
    /// Must evaluate to a Procedure returning Boolean.
    pub condition: Rc<Expr>,
    /// One operation per tape, in tape order.
    pub head_ops: Vec<HeadOp>,
    /// Optional callback invoked with the pre-transition symbols.
    pub output: Option<Rc<Expr>>,
    /// Where control goes if this transition fires.
    pub next_state: NextStateName,
}

/// One state of the machine.
#[derive(Debug)]
pub struct AutomatonState {
    /// The state's name, used to resolve `next_state` references to it.
    pub name: String,
    /// Optional sub-automaton invoked before the transition table.
    pub base_machine: Option<Rc<Expr>>,
    /// Optional callback invoked once on state entry.
    pub state_output: Option<Rc<Expr>>,
    /// Transition table. Empty means this state is "automatic".
    pub transitions: Vec<Transition>,
}

impl HeadOp {
    fn to_source(&self) -> String {
        match self {
            HeadOp::MoveLeft => "<-".to_string(),
            HeadOp::MoveRight => "->".to_string(),
            HeadOp::Nop => ".".to_string(),
            HeadOp::Write(expr) => Expr::to_string(expr),
        }
    }
}

impl NextStateName {
    fn to_source(&self) -> String {
        match self {
            NextStateName::SelfState => "self".to_string(),
            NextStateName::Next => "next".to_string(),
            NextStateName::Halt => "halt".to_string(),
            NextStateName::Accept => "accept".to_string(),
            NextStateName::Reject => "reject".to_string(),
            NextStateName::Named(name) => name.clone(),
        }
    }
}

impl Transition {
    fn to_source(&self) -> String {
        let mut parts = vec![Expr::to_string(&self.condition)];
        parts.extend(self.head_ops.iter().map(HeadOp::to_source));
        parts.push(self.next_state.to_source());
        if let Some(output) = &self.output {
            parts.push(Expr::to_string(output));
        }
        format!("({})", parts.join(" "))
    }
}

impl AutomatonState {
    /// Reconstructs this state's surface syntax, used by `Expr::to_string`
    /// on the enclosing `Automaton` node.
    fn to_source(&self) -> String {
        let mut s = format!("({}", self.name);
        if let Some(base) = &self.base_machine {
            s.push_str(&format!(": {}", Expr::to_string(base)));
        }
        let transitions: Vec<String> = self.transitions.iter().map(Transition::to_source).collect();
        s.push_str(&format!(" ({})", transitions.join(" ")));
        if let Some(output) = &self.state_output {
            s.push_str(&format!(" {}", Expr::to_string(output)));
        }
        s.push(')');
        s
    }
}

/// A transition's resolved control-flow action.
#[derive(Debug, Clone, Copy)]
enum Action {
    Halt,
    Accept,
    Reject,
    Continue(usize),
}

/// The one-shot compiled form of an automaton: every transition's
/// `next_state` resolved to an index-based [`Action`].
#[derive(Debug)]
pub struct CompiledAutomaton {
    actions: Vec<Vec<Action>>,
}

fn compile(states: &[AutomatonState]) -> Result<CompiledAutomaton, String> {
    let mut name_to_index = std::collections::HashMap::new();
    for (i, s) in states.iter().enumerate() {
        name_to_index.insert(s.name.clone(), i);
    }

    let mut actions = Vec::with_capacity(states.len());
    for (i, state) in states.iter().enumerate() {
        let mut row = Vec::with_capacity(state.transitions.len());
        for t in &state.transitions {
            let action = match &t.next_state {
                NextStateName::SelfState => Action::Continue(i),
                NextStateName::Next => Action::Continue(i + 1),
                NextStateName::Halt => Action::Halt,
                NextStateName::Accept => Action::Accept,
                NextStateName::Reject => Action::Reject,
                NextStateName::Named(name) => match name_to_index.get(name) {
                    Some(idx) => Action::Continue(*idx),
                    None => {
                        return Err(format!("transition references unknown state '{name}'"))
                    }
                },
            };
            row.push(action);
        }
        actions.push(row);
    }
    Ok(CompiledAutomaton { actions })
}

struct Tape {
    head: usize,
    contents: Vec<Value>,
}

fn get_tapes(args: &[Value], number_of_tapes: usize) -> Result<Vec<Tape>, Value> {
    if args.len() != number_of_tapes {
        return Err(Value::Error(format!(
            "automaton: expected {number_of_tapes} tape argument(s), got {}",
            args.len()
        )));
    }
    let mut tapes = Vec::with_capacity(args.len());
    for arg in args {
        let Value::Pair(head, contents) = arg else {
            return Err(Value::Error(
                "automaton: each tape argument must be (head . contents)".to_string(),
            ));
        };
        let Value::Integer(head) = head.as_ref() else {
            return Err(Value::Error(
                "automaton: tape head must be an integer".to_string(),
            ));
        };
        if *head < 0 {
            return Err(Value::Error(
                "automaton: tape head must be non-negative".to_string(),
            ));
        }
        let contents = contents.to_vec().map_err(|_| {
            Value::Error("automaton: tape contents must be a proper list".to_string())
        })?;
        tapes.push(Tape { head: *head as usize, contents });
    }
    Ok(tapes)
}

fn tapes_to_values(tapes: &[Tape]) -> Vec<Value> {
    tapes
        .iter()
        .map(|t| {
            Value::Pair(
                Box::new(Value::Integer(t.head as i64)),
                Box::new(Value::list(t.contents.clone())),
            )
        })
        .collect()
}

/// Builds the result pair `(exit_code . tapes')`, with tapes in reverse
/// insertion order — a deliberate bit-exact match of the source's
/// `construct_results`, not a bug to fix.
fn construct_results(exit_code: i64, tapes: &[Tape]) -> Value {
    let mut tapes_list = Value::Null;
    for tape in tapes {
        let contents_list = Value::list(tape.contents.clone());
        let pair = Value::Pair(
            Box::new(Value::Integer(tape.head as i64)),
            Box::new(contents_list),
        );
        tapes_list = Value::Pair(Box::new(pair), Box::new(tapes_list));
    }
    Value::Pair(Box::new(Value::Integer(exit_code)), Box::new(tapes_list))
}

/// Applies one transition's head operations to every tape.
///
/// **Left-end sentinel quirk**: when a tape's head is
/// `0`, its configured operation is skipped, the head snaps to `1`, and the
/// loop `break`s — every tape *after* this one in the transition's
/// head-operation list does not get its operation applied this step. This
/// mirrors the source exactly and is intentionally preserved, not patched
/// into a per-tape `continue`.
fn apply_head_operations(tapes: &mut [Tape], ops: &[HeadOp], env: &Env) -> Option<Value> {
    for (tape, op) in tapes.iter_mut().zip(ops.iter()) {
        if tape.head == 0 {
            tape.head = 1;
            break;
        }
        match op {
            HeadOp::MoveLeft => tape.head -= 1,
            HeadOp::MoveRight => {
                tape.head += 1;
                if tape.head >= tape.contents.len() {
                    tape.contents.push(Value::Null);
                }
            }
            HeadOp::Write(expr) => {
                let v = Expr::interpret(expr, env);
                if let Value::Error(_) = v {
                    return Some(v);
                }
                tape.contents[tape.head] = v;
            }
            HeadOp::Nop => {}
        }
    }
    None
}

/// Runs the compiled machine. Compiles lazily on first call.
pub fn run(
    number_of_tapes: usize,
    states: &[AutomatonState],
    compiled_cache: &RefCell<Option<Rc<CompiledAutomaton>>>,
    args: &[Value],
    env: &Env,
) -> Value {
    if compiled_cache.borrow().is_none() {
        match compile(states) {
            Ok(c) => *compiled_cache.borrow_mut() = Some(Rc::new(c)),
            Err(e) => return Value::Error(e),
        }
    }
    let compiled = compiled_cache.borrow().clone().unwrap();

    let mut tapes = match get_tapes(args, number_of_tapes) {
        Ok(t) => t,
        Err(e) => return e,
    };

    let mut state_index = 0usize;
    loop {
        if state_index >= states.len() {
            return construct_results(0, &tapes);
        }
        let state = &states[state_index];

        if let Some(base_machine) = &state.base_machine {
            let bm_value = Expr::interpret(base_machine, env);
            if let Value::Error(_) = bm_value {
                return bm_value;
            }
            let tape_args = tapes_to_values(&tapes);
            match apply_value(&bm_value, &tape_args) {
                Value::Integer(0) => {}
                Value::Integer(code) => return construct_results(code, &tapes),
                Value::Error(e) => return Value::Error(e),
                other => {
                    return Value::Error(format!(
                        "automaton: base machine must return an integer exit code, got {}",
                        other.type_name()
                    ))
                }
            }
        }

        let symbols: Vec<Value> = tapes
            .iter()
            .map(|t| t.contents.get(t.head).cloned().unwrap_or(Value::Null))
            .collect();

        if let Some(output) = &state.state_output {
            let output_value = Expr::interpret(output, env);
            if let Value::Error(_) = output_value {
                return output_value;
            }
            if let Value::Error(e) = apply_value(&output_value, &symbols) {
                return Value::Error(e);
            }
        }

        if state.transitions.is_empty() {
            state_index += 1;
            continue;
        }

        let mut fired = false;
        for (ti, transition) in state.transitions.iter().enumerate() {
            let cond_value = Expr::interpret(&transition.condition, env);
            if let Value::Error(_) = cond_value {
                return cond_value;
            }
            match apply_value(&cond_value, &symbols) {
                Value::Boolean(true) => {
                    if let Some(e) = apply_head_operations(&mut tapes, &transition.head_ops, env) {
                        return e;
                    }
                    if let Some(output) = &transition.output {
                        let output_value = Expr::interpret(output, env);
                        if let Value::Error(_) = output_value {
                            return output_value;
                        }
                        if let Value::Error(e) = apply_value(&output_value, &symbols) {
                            return Value::Error(e);
                        }
                    }
                    match compiled.actions[state_index][ti] {
                        Action::Halt => return construct_results(0, &tapes),
                        Action::Accept => return construct_results(1, &tapes),
                        Action::Reject => return construct_results(-1, &tapes),
                        Action::Continue(next) => state_index = next,
                    }
                    fired = true;
                    break;
                }
                Value::Boolean(false) => continue,
                Value::Error(e) => return Value::Error(e),
                other => {
                    return Value::Error(format!(
                        "automaton: transition condition must be boolean, got {}",
                        other.type_name()
                    ))
                }
            }
        }
        if !fired {
            return Value::Error(
                "automaton: no transition matched the current symbols".to_string(),
            );
        }
    }
}
