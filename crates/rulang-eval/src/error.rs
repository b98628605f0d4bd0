//! Runtime error types and the evaluator's control-flow channel.

use crate::value::Value;
use std::fmt;

/// Evaluation error — runtime failures delivered to the host.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// Wrong tag for an operation (calling a non-function, `-` on a string).
    Type(String),
    /// `get` or `assign` on a name with no binding in scope.
    Name(String),
    /// `validate` failure: dotted path, expected type, actual tag
    /// (`"missing"` when the field is absent, `"null"` when it is Null).
    Validation {
        path: String,
        expected: String,
        actual: String,
    },
    /// `apply` of an unregistered event, or `rollback` past the start.
    Transition(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(msg) => write!(f, "type error: {msg}"),
            Self::Name(name) => write!(f, "undefined name: {name}"),
            Self::Validation {
                path,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "validation error at '{path}': expected {expected}, got {actual}"
                )
            }
            Self::Transition(msg) => write!(f, "transition error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Everything that can travel up the evaluator's `Err` channel.
///
/// `return` and `next()` are not errors — they are control signals the
/// evaluator routes internally ([`Signal::Return`] stops at the nearest
/// function call; [`Signal::Next`] is consumed by the host's middleware
/// driver). Keeping them in the same channel as [`EvalError`] lets `?`
/// propagate both, while the sum keeps the two statically distinct.
#[derive(Debug, Clone)]
pub enum Signal {
    /// A runtime error unwinding to the host.
    Error(EvalError),
    /// `return [value]` unwinding to the nearest enclosing call frame.
    Return(Value),
    /// `next()` unwinding to the middleware driver.
    Next,
}

impl From<EvalError> for Signal {
    fn from(e: EvalError) -> Self {
        Signal::Error(e)
    }
}

/// Result alias used throughout the evaluator.
pub type EvalResult<T> = Result<T, Signal>;
