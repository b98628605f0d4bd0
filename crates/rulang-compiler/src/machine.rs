//! The state-machine compiler.
//!
//! Two passes over the program body:
//!
//! 1. Every `state` declaration materializes a [`CompiledState`] with
//!    dense indices (declaration order, index 0 initial) and empty
//!    transition rows.
//! 2. Every `transition` declaration resolves its machine name and each
//!    rule's from/to state names to indices, then inserts
//!    `transitions[from][event] = to`. A later rule for the same
//!    `(from, event)` pair overwrites the earlier one.

use rulang_types::ast::{Program, Stmt};
use rulang_types::CompileError;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A state machine lowered to dense integer indices.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledState {
    /// The machine name (`Order`).
    pub name: String,
    /// State names in declaration order; indices are positions here.
    pub state_names: Vec<String>,
    /// Reverse lookup from state name to index.
    pub name_to_index: BTreeMap<String, usize>,
    /// The initial state index. Always 0: the first declared state.
    pub initial: usize,
    /// One row per source state: `transitions[from][event] = to`.
    pub transitions: Vec<BTreeMap<String, usize>>,
}

impl CompiledState {
    fn new(name: String, state_names: Vec<String>) -> Self {
        let name_to_index = state_names
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let transitions = vec![BTreeMap::new(); state_names.len()];
        Self {
            name,
            state_names,
            name_to_index,
            initial: 0,
            transitions,
        }
    }

    /// Number of states in the machine.
    pub fn state_count(&self) -> usize {
        self.state_names.len()
    }

    /// Resolve a state name to its index.
    pub fn index_of(&self, state: &str) -> Option<usize> {
        self.name_to_index.get(state).copied()
    }

    /// Look up the target of `(from, event)`, if a rule is registered.
    pub fn target(&self, from: usize, event: &str) -> Option<usize> {
        self.transitions.get(from)?.get(event).copied()
    }
}

/// Compiled machines keyed by machine name.
pub type StateTableMap = BTreeMap<String, Rc<CompiledState>>;

/// Compile every `state`/`transition` declaration in the program.
///
/// The remaining statements are left untouched; the evaluator treats the
/// declarations as no-ops once the tables exist.
pub fn compile_states(program: &Program) -> Result<StateTableMap, CompileError> {
    let mut machines: BTreeMap<String, CompiledState> = BTreeMap::new();

    // Pass 1: materialize every declared machine.
    for stmt in &program.body {
        if let Stmt::State(decl) = stmt {
            let state_names = decl.states.iter().map(|s| s.name.clone()).collect();
            machines.insert(
                decl.name.name.clone(),
                CompiledState::new(decl.name.name.clone(), state_names),
            );
        }
    }

    // Pass 2: resolve transition rules against the declared machines.
    for stmt in &program.body {
        if let Stmt::Transition(decl) = stmt {
            let machine = machines.get_mut(&decl.state_name.name).ok_or_else(|| {
                CompileError::new(
                    decl.state_name.span,
                    format!("unknown state machine '{}'", decl.state_name.name),
                )
            })?;
            for rule in &decl.rules {
                let from = machine.index_of(&rule.from.name).ok_or_else(|| {
                    CompileError::new(
                        rule.from.span,
                        format!(
                            "unknown state '{}' in machine '{}'",
                            rule.from.name, machine.name
                        ),
                    )
                })?;
                let to = machine.index_of(&rule.to.name).ok_or_else(|| {
                    CompileError::new(
                        rule.to.span,
                        format!(
                            "unknown state '{}' in machine '{}'",
                            rule.to.name, machine.name
                        ),
                    )
                })?;
                // Last writer wins on duplicate (from, event) pairs.
                machine.transitions[from].insert(rule.event.clone(), to);
            }
        }
    }

    Ok(machines
        .into_iter()
        .map(|(name, machine)| (name, Rc::new(machine)))
        .collect())
}
