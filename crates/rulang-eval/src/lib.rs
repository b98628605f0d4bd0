//! Rulang tree-walking evaluator.
//!
//! Executes a [`rulang_compiler::CompiledProgram`] against a caller-supplied
//! root [`Scope`]. HTTP-flavored declarations are forwarded to a [`Host`];
//! the host-support layer in [`host`] provides the reference [`Registry`]
//! host, request/response construction, and the middleware dispatch driver.

pub mod error;
pub mod evaluator;
pub mod host;
pub mod machine;
pub mod scope;
pub mod value;

pub use error::{EvalError, EvalResult, Signal};
pub use evaluator::{Evaluator, HandlerOutcome};
pub use host::{dispatch, DispatchPlan, Host, Registry, RequestParts, ResponseState};
pub use machine::MachineInstance;
pub use scope::Scope;
pub use value::{NativeFn, Value};
