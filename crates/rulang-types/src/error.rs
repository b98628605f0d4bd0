//! Front-end error types.
//!
//! Each pipeline stage has its own error struct carrying the span of the
//! offending input. The first error aborts the stage: there is no
//! collection or recovery, so every stage returns `Result<_, TheError>`.

use crate::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scanner failure: unexpected character or a bare `!`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("lex error at {span}: {message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

impl LexError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Grammar mismatch. `actual` is the display form of the token the parser
/// was looking at when it gave up.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("parse error at {span}: {message} (found '{actual}')")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub actual: String,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            actual: actual.into(),
        }
    }
}

/// State-compiler failure: a `transition` block naming an unknown machine
/// or an unknown from/to state.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("compile error at {span}: {message}")]
pub struct CompileError {
    pub span: Span,
    pub message: String,
}

impl CompileError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Any front-end failure. The pipeline entry point returns this so callers
/// get one error type for lex, parse, and state-compile failures alike.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FrontendError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl FrontendError {
    /// The span the error points at, whichever stage produced it.
    pub fn span(&self) -> Span {
        match self {
            Self::Lex(e) => e.span,
            Self::Parse(e) => e.span,
            Self::Compile(e) => e.span,
        }
    }
}
