//! Lexically nested binding environments.
//!
//! A [`Scope`] is a shared handle (`Rc<RefCell<..>>`) to one frame with a
//! parent pointer. Handles are cheap to clone, and a function value that
//! captures a scope keeps the whole parent chain alive for as long as the
//! function lives. Captured chains can form reference cycles (a closure
//! stored in a structure it captures); such a cycle is only reclaimed
//! when every outside handle drops.

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug)]
struct ScopeData {
    bindings: BTreeMap<String, Value>,
    parent: Option<Scope>,
}

/// One frame of the environment chain.
#[derive(Debug, Clone)]
pub struct Scope {
    inner: Rc<RefCell<ScopeData>>,
}

impl Scope {
    /// Create a root scope with no parent.
    pub fn root() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScopeData {
                bindings: BTreeMap::new(),
                parent: None,
            })),
        }
    }

    /// Create a child scope whose parent is this one.
    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScopeData {
                bindings: BTreeMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Bind a name in this frame, shadowing any same-name binding in an
    /// enclosing frame (or replacing one in this frame).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.inner.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Look up a name, walking from this frame to the root.
    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        let data = self.inner.borrow();
        if let Some(value) = data.bindings.get(name) {
            return Ok(value.clone());
        }
        match &data.parent {
            Some(parent) => parent.get(name),
            None => Err(EvalError::Name(name.to_string())),
        }
    }

    /// Update an existing binding in the frame that defines it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let mut data = self.inner.borrow_mut();
        if let Some(slot) = data.bindings.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &data.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(EvalError::Name(name.to_string())),
        }
    }
}
