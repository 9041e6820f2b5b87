//! Lexical environments: a parent chain of mutable scopes.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// A shared handle to a scope. Cloning the handle aliases the scope;
/// closures capture their defining environment this way.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Scope>>);

struct Scope {
    vars: FxHashMap<String, Value>,
    parent: Option<Env>,
}

impl Env {
    pub fn root() -> Env {
        Env(Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: None,
        })))
    }

    /// A child scope whose lookups fall through to `self`.
    pub fn child(&self) -> Env {
        Env(Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(self.clone()),
        })))
    }

    /// Declare (or redeclare) a binding in this scope.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().vars.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        if let Some(value) = scope.vars.get(name) {
            return Some(value.clone());
        }
        scope.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Assign to the nearest scope that defines `name`. Returns false if
    /// no scope does.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut scope = self.0.borrow_mut();
        if let Some(slot) = scope.vars.get_mut(name) {
            *slot = value;
            return true;
        }
        match &scope.parent {
            Some(parent) => parent.set(name, value),
            None => false,
        }
    }
}
