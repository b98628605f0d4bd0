//! Live state-machine instances and the member protocol for state values.
//!
//! Instances are mutated in place behind `Rc<RefCell<..>>`: every binding
//! to the same instance observes the same current state and history.

use crate::error::{EvalError, EvalResult};
use crate::value::{NativeFn, Value};
use rulang_compiler::CompiledState;
use std::cell::RefCell;
use std::rc::Rc;

/// A cursor over a compiled state machine.
///
/// Invariants: `history` is never empty, its last element equals
/// `current`, and every element is a valid index into the machine's
/// state list.
#[derive(Debug, Clone)]
pub struct MachineInstance {
    pub compiled: Rc<CompiledState>,
    pub current: usize,
    pub history: Vec<usize>,
}

impl MachineInstance {
    /// A fresh instance sitting on the machine's initial state.
    pub fn new(compiled: Rc<CompiledState>) -> Self {
        let initial = compiled.initial;
        Self {
            compiled,
            current: initial,
            history: vec![initial],
        }
    }

    /// The current state's name.
    pub fn state_name(&self) -> &str {
        &self.compiled.state_names[self.current]
    }

    /// Apply an event: follow `(current, event)` in the transition table,
    /// advancing the cursor and appending to history.
    pub fn apply(&mut self, event: &str) -> Result<(), EvalError> {
        match self.compiled.target(self.current, event) {
            Some(to) => {
                self.current = to;
                self.history.push(to);
                Ok(())
            }
            None => Err(EvalError::Transition(format!(
                "Cannot apply {event} in state {}",
                self.state_name()
            ))),
        }
    }

    /// Undo the most recent `apply`, returning the name of the state the
    /// cursor lands on.
    pub fn rollback(&mut self) -> Result<String, EvalError> {
        if self.history.len() <= 1 {
            return Err(EvalError::Transition("no previous state".into()));
        }
        self.history.pop();
        self.current = *self.history.last().expect("history stays non-empty");
        Ok(self.state_name().to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Member protocol
// ─────────────────────────────────────────────────────────────────────

/// Member access on a `StateType` value. Only `.new` is defined.
pub fn state_type_member(compiled: &Rc<CompiledState>, property: &str) -> EvalResult<Value> {
    match property {
        "new" => {
            let compiled = compiled.clone();
            Ok(Value::Native(NativeFn::new("new", move |_args| {
                Ok(Value::StateInstance(Rc::new(RefCell::new(
                    MachineInstance::new(compiled.clone()),
                ))))
            })))
        }
        _ => Err(EvalError::Type(format!(
            "state type '{}' has no member '{property}'",
            compiled.name
        ))
        .into()),
    }
}

/// Member access on a `StateInstance` value: `state`, `history`,
/// `apply`, and `rollback`.
pub fn state_instance_member(
    cell: &Rc<RefCell<MachineInstance>>,
    property: &str,
) -> EvalResult<Value> {
    match property {
        "state" => Ok(Value::Str(cell.borrow().state_name().to_string())),
        "history" => {
            let instance = cell.borrow();
            let names = instance
                .history
                .iter()
                .map(|&i| Value::Str(instance.compiled.state_names[i].clone()))
                .collect();
            Ok(Value::Array(names))
        }
        "apply" => {
            let cell = cell.clone();
            Ok(Value::Native(NativeFn::new("apply", move |args| {
                let event = match args.as_slice() {
                    [Value::Str(event)] => event.clone(),
                    _ => {
                        return Err(EvalError::Type(
                            "apply expects exactly one string event".into(),
                        )
                        .into());
                    }
                };
                cell.borrow_mut().apply(&event)?;
                Ok(Value::Null)
            })))
        }
        "rollback" => {
            let cell = cell.clone();
            Ok(Value::Native(NativeFn::new("rollback", move |_args| {
                let name = cell.borrow_mut().rollback()?;
                Ok(Value::Str(name))
            })))
        }
        _ => {
            let name = cell.borrow().compiled.name.clone();
            Err(EvalError::Type(format!(
                "state instance of '{name}' has no member '{property}'"
            ))
            .into())
        }
    }
}
