//! A compiler and interpreter for BF, running on a fixed [`TAPE_LEN`] byte tape.
//!
//! Source goes through the [`lex::Lexer`], gets turned into a [`compiler::Program`] (with runs of
//! the same command collapsed and loop jumps resolved) and is then run by the
//! [`interpreter::Interpreter`].
//!
//! The `,` (input) command is parsed, but running it is an error.

use std::io::Write;

use thiserror::Error;

pub mod compiler;
pub mod interpreter;
pub mod lex;

pub use compiler::{compile, CompileError, Program};
pub use interpreter::{Interpreter, RuntimeError, TAPE_LEN};

/// Either the program didn't compile or it failed while running.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Compiles the `source` code of a program.
pub fn compile_source(source: &[u8]) -> Result<Program, CompileError> {
    compile(lex::Lexer(source))
}

/// Interpret a given `source` code of a program, writing whatever it outputs to `output`.
///
/// Returns error if the program is malformed (has unmatched `[` and/or `]`) or fails at runtime.
pub fn interpret(source: &[u8], output: &mut dyn Write) -> Result<(), Error> {
    let program = compile_source(source)?;

    Interpreter(program, output).run()?;

    Ok(())
}
