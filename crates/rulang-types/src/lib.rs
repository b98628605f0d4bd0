//! Shared types for the Rulang front end.
//!
//! This crate defines the AST node types, source spans, and the error
//! types used across the lexer, parser, and state compiler.

pub mod ast;
mod error;
mod span;

pub use error::{CompileError, FrontendError, LexError, ParseError};
pub use span::{SourceFile, Span};
