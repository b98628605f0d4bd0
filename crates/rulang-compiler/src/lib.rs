//! Rulang compiler: orchestrates the front-end pipeline.
//!
//! ```text
//! Rulang Source → Lexer → Parser → State Compiler → CompiledProgram
//! ```
//!
//! The evaluator consumes a [`CompiledProgram`]: the parsed statement list
//! plus the dense transition tables for every declared state machine.

pub mod machine;

pub use machine::{compile_states, CompiledState, StateTableMap};

use rulang_lexer::Lexer;
use rulang_parser::Parser;
use rulang_types::ast::Program;
use rulang_types::{FrontendError, SourceFile};

/// The output of the front end: the untouched program plus one
/// [`CompiledState`] per `state` declaration, keyed by machine name.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub program: Program,
    pub machines: StateTableMap,
}

/// Full front-end pipeline: source text → [`CompiledProgram`].
///
/// Returns the first lex, parse, or state-compile error; there is no
/// recovery (the first error aborts compilation).
pub fn compile(source: &str, name: &str) -> Result<CompiledProgram, FrontendError> {
    let source_file = SourceFile::new(name, source);

    // 1. Lex
    let tokens = Lexer::new(&source_file).lex()?;

    // 2. Parse
    let program = Parser::new(tokens).parse()?;

    // 3. Compile state machines
    let machines = machine::compile_states(&program)?;

    Ok(CompiledProgram { program, machines })
}
