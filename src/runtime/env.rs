use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::Value;

/// A single lexical frame: an ordered list of bindings plus an optional
/// parent. Kept as a linked chain (not the flat indexed-vec model some
/// interpreters use) because a [`Value::Procedure`] must be able to snapshot
/// a frame and carry it around independent of the live call stack.
#[derive(Debug, Default)]
struct Frame {
    bindings: Vec<(String, Value)>,
    parent: Option<Env>,
}

/// A reference-counted handle to a lexical frame.
#[derive(Debug, Clone)]
pub struct Env(Rc<RefCell<Frame>>);

impl Env {
    /// Creates a fresh frame with no parent (the global frame).
    pub fn new_global() -> Env {
        Env(Rc::new(RefCell::new(Frame {
            bindings: Vec::new(),
            parent: None,
        })))
    }

    /// Creates a fresh child frame of `self`.
    pub fn child(&self) -> Env {
        Env(Rc::new(RefCell::new(Frame {
            bindings: Vec::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Looks up `name`, searching this frame then walking parents to the
    /// root. Returns `None` if unbound anywhere in the chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        if let Some((_, v)) = frame.bindings.iter().rev().find(|(n, _)| n == name) {
            return Some(v.clone());
        }
        match &frame.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    /// **define-local**: always creates or overwrites the binding in
    /// *this* frame. Used by `let`-style binding and parameter binding.
    pub fn define_local(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut frame = self.0.borrow_mut();
        if let Some(slot) = frame.bindings.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            frame.bindings.push((name, value));
        }
    }

    /// **set!**: overwrites the binding if it already exists in *this*
    /// frame, otherwise creates it here. Never walks parents — grounded in
    /// `stack_frame_set_variable`, which only ever consults
    /// `find_variable_locally`.
    pub fn set_local_or_create(&self, name: impl Into<String>, value: Value) {
        self.define_local(name, value);
    }

    /// **define-global**: walks to the root frame and defines there. Used
    /// by `define` and by `include`'s idempotence guard.
    pub fn define_global(&self, name: impl Into<String>, value: Value) {
        let mut current = self.clone();
        loop {
            let parent = current.0.borrow().parent.clone();
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        current.define_local(name, value);
    }

    /// True if `name` is bound anywhere in the chain.
    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Walks to the root (global) frame of this chain.
    pub fn root(&self) -> Env {
        let parent = self.0.borrow().parent.clone();
        match parent {
            Some(p) => p.root(),
            None => self.clone(),
        }
    }

    /// Deep-copies the entire chain of bindings into a brand-new frame
    /// graph, used when a procedure captures its defining environment: the
    /// snapshot is a by-value copy taken at the moment of interpretation,
    /// not a live reference.
    pub fn snapshot(&self) -> Env {
        let frame = self.0.borrow();
        let parent = frame.parent.as_ref().map(Env::snapshot);
        Env(Rc::new(RefCell::new(Frame {
            bindings: frame.bindings.clone(),
            parent,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_local_shadows_in_child_frame() {
        let global = Env::new_global();
        global.define_local("x", Value::Integer(1));
        let child = global.child();
        child.define_local("x", Value::Integer(2));
        assert!(child.get("x").unwrap().equals(&Value::Integer(2)));
        assert!(global.get("x").unwrap().equals(&Value::Integer(1)));
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let global = Env::new_global();
        global.define_local("x", Value::Integer(42));
        let child = global.child().child();
        assert!(child.get("x").unwrap().equals(&Value::Integer(42)));
    }

    #[test]
    fn set_local_or_create_never_walks_parents() {
        let global = Env::new_global();
        global.define_local("x", Value::Integer(1));
        let child = global.child();
        child.set_local_or_create("x", Value::Integer(99));
        assert!(child.get("x").unwrap().equals(&Value::Integer(99)));
        assert!(global.get("x").unwrap().equals(&Value::Integer(1)));
    }

    #[test]
    fn define_global_writes_to_the_root() {
        let global = Env::new_global();
        let child = global.child().child();
        child.define_global("g", Value::Integer(7));
        assert!(global.get("g").unwrap().equals(&Value::Integer(7)));
    }

    #[test]
    fn root_finds_the_global_frame_from_any_depth() {
        let global = Env::new_global();
        let nested = global.child().child().child();
        assert!(nested.root().get("missing").is_none());
        global.define_local("x", Value::Integer(1));
        assert!(nested.root().get("x").unwrap().equals(&Value::Integer(1)));
    }

    #[test]
    fn unbound_lookup_returns_none() {
        let global = Env::new_global();
        assert!(global.get("missing").is_none());
    }

    #[test]
    fn snapshot_survives_source_scope_mutation() {
        let global = Env::new_global();
        let defining = global.child();
        defining.define_local("x", Value::Integer(10));
        let captured = defining.snapshot();
        defining.set_local_or_create("x", Value::Integer(999));
        assert!(captured.get("x").unwrap().equals(&Value::Integer(10)));
    }
}
