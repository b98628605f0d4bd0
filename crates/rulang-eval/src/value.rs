//! The runtime value domain.
//!
//! A tagged union over everything a Rulang expression can produce,
//! including compiled state-machine types and live state instances.
//! Object entries are an insertion-ordered `Vec<(String, Value)>` — key
//! order is observable through `print` and must match declaration order.

use crate::error::EvalResult;
use crate::machine::MachineInstance;
use crate::scope::Scope;
use rulang_compiler::CompiledState;
use rulang_types::ast::{Block, Ident};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A host-implemented callable exposed to the language.
#[derive(Clone)]
pub struct NativeFn {
    /// Name used in debug output.
    pub name: &'static str,
    func: Rc<dyn Fn(Vec<Value>) -> EvalResult<Value>>,
}

impl NativeFn {
    pub fn new(
        name: &'static str,
        func: impl Fn(Vec<Value>) -> EvalResult<Value> + 'static,
    ) -> Self {
        Self {
            name,
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> EvalResult<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

/// A user function value: parameter names, body, and the captured scope.
#[derive(Debug, Clone)]
pub struct Function {
    pub params: Vec<Ident>,
    pub body: Rc<Block>,
    pub captured: Scope,
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(f64),
    Str(String),
    Bool(bool),
    Array(Vec<Value>),
    /// Insertion-ordered key/value entries.
    Object(Vec<(String, Value)>),
    Function(Rc<Function>),
    Native(NativeFn),
    StateType(Rc<CompiledState>),
    /// A live machine cursor. Shared: two bindings to the same instance
    /// observe the same current state and history.
    StateInstance(Rc<RefCell<MachineInstance>>),
}

impl Value {
    /// The value's tag name, as used in error messages and validation.
    pub fn tag_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Native(_) => "native function",
            Value::StateType(_) => "state type",
            Value::StateInstance(_) => "state instance",
        }
    }

    /// Truthiness: Null, `false`, `0`, and `""` are falsy; everything
    /// else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// `==` semantics: equal iff the tags match and (for Null) always,
    /// (for Number/String/Boolean) the payloads match. Every other tag
    /// pair — including two arrays or two objects — compares false.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// Look up an object key. `None` when the value is not an Object or
    /// the key is absent.
    pub fn object_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ── Host JSON boundary ────────────────────────────────────────────

    /// Convert to a `serde_json::Value` for the host's wire encoding.
    ///
    /// Callable and state-machine values serialize as their display
    /// strings; non-finite numbers become JSON null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64
                {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(entries) => {
                let map = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
            other => serde_json::Value::String(other.to_string()),
        }
    }

    /// Convert an inbound `serde_json::Value` (request body) to a value.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    /// Stringification, as used by `print`, string concatenation, and the
    /// display forms at the host boundary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Function(_) => f.write_str("<function>"),
            Value::Native(_) => f.write_str("<native function>"),
            Value::StateType(compiled) => write!(f, "<state-type {}>", compiled.name),
            Value::StateInstance(cell) => {
                let instance = cell.borrow();
                write!(f, "<{}: {}>", instance.compiled.name, instance.state_name())
            }
        }
    }
}
