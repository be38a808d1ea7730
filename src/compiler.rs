use std::{fmt, iter::Peekable, ops::Deref};

use thiserror::Error;
use tracing::debug;

use crate::lex::{Lexer, Token};

/// The address type, which can represent where jumps jump to.
pub type Addr = usize;

/// This a representation of a BF instruction.
///
/// This mostly just follows the "specification" of the language itself, with two notable differences:
/// - Runs of `>`, `<`, `+`, `-` and `.` are collapsed into a single instruction, the length of the
///   run is stored in the [`Op::arg`]
/// - Instructions for `[` and `]` store the address where they jump to (in [`Op::arg`] too)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Inst {
    /// `>`; Increment the data pointer by `arg` (to point to a cell to the "right").
    IncPtr,

    /// `<`; Decrement the data pointer by `arg` (to point to a cell to the "left").
    DecPtr,

    /// `+`; Increment the byte at the data pointer by `arg`, wrapping.
    Inc,

    /// `-`; Decrement the byte at the data pointer by `arg`, wrapping.
    Dec,

    /// `.`; Output the byte at the data pointer `arg` times.
    Out,

    /// `,`; Accept one byte of input, storing its value in the byte at the data pointer.
    ///
    /// `arg` is unused. Interpreter doesn't support this one.
    Inp,

    /// Jump if zero.
    ///
    /// This is how `[` is "desugared".
    ///
    /// If the byte at the data pointer is zero, then instead of moving the instruction pointer
    /// forward to the next command, jump it (forward) to `arg`, which is the address right after
    /// the matching [`Jnz`](Inst::Jnz).
    Jz,

    /// Jump if not zero.
    ///
    /// This is how `]` is "desugared".
    ///
    /// If the byte at the data pointer is not zero, then instead of moving the instruction pointer
    /// forward to the next command, jump it (backwards) to `arg`, which is the address right after
    /// the matching [`Jz`](Inst::Jz).
    Jnz,
}

impl Inst {
    /// Returns the source character this instruction was compiled from.
    pub const fn symbol(self) -> char {
        match self {
            Inst::IncPtr => '>',
            Inst::DecPtr => '<',
            Inst::Inc => '+',
            Inst::Dec => '-',
            Inst::Out => '.',
            Inst::Inp => ',',
            Inst::Jz => '[',
            Inst::Jnz => ']',
        }
    }
}

/// A single compiled instruction together with its argument.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Op {
    pub inst: Inst,
    /// Repeat count or jump address, depending on `inst`.
    pub arg: Addr,
}

impl Op {
    pub const fn new(inst: Inst, arg: Addr) -> Self {
        Op { inst, arg }
    }
}

/// Compiled program, ready to be run by the [`Interpreter`](crate::interpreter::Interpreter).
///
/// Indices into the program are jump addresses, so it's never reordered after compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
}

impl Deref for Program {
    type Target = [Op];

    fn deref(&self) -> &[Op] {
        &self.ops
    }
}

/// Dumps the program, one instruction per line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            writeln!(f, "{i}: {} ({})", op.inst.symbol(), op.arg)?;
        }

        Ok(())
    }
}

/// `[`s and `]`s that are not matched properly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A `]` with no `[` before it.
    #[error("unmatched `]` at instruction {index}")]
    UnmatchedClose { index: Addr },
    /// A `[` that is never closed. If there are several, this is the innermost one.
    #[error("unmatched `[` at instruction {index}")]
    UnmatchedOpen { index: Addr },
}

/// Converts lexer output into a program.
///
/// Returns `Err` if `[`s and `]`s are not matched properly in the source.
pub fn compile(source: Lexer) -> Result<Program, CompileError> {
    let source_len = source.len_hint();
    let mut source = source.peekable();
    let mut v = Vec::with_capacity(source_len);
    let mut jump_stack = Vec::with_capacity(4);

    while let Some(t) = source.next() {
        use crate::lex::Token::*;

        let op = match t {
            // Instructions that collapse runs of themselves
            RAngle => Op::new(Inst::IncPtr, run(t, &mut source)),
            LAngle => Op::new(Inst::DecPtr, run(t, &mut source)),

            Plus => Op::new(Inst::Inc, run(t, &mut source)),
            Minus => Op::new(Inst::Dec, run(t, &mut source)),

            Dot => Op::new(Inst::Out, run(t, &mut source)),
            Comma => Op::new(Inst::Inp, 0),

            LBrack => {
                // Remember where this `[` is, the address is patched when the matching `]` is
                // found. Until then it's garbage.
                jump_stack.push(v.len());
                Op::new(Inst::Jz, 0)
            }

            RBrack => {
                // Find the matching `[`
                let Some(jz) = jump_stack.pop() else {
                    return Err(CompileError::UnmatchedClose { index: v.len() });
                };

                // Both jumps land right *after* their counterpart:
                //
                //         *--------------------*
                //        /                     v
                // [..., Jz, N, ..., Jnz, ø]
                //           ^        /
                //           *-------*
                v[jz] = Op::new(Inst::Jz, v.len() + 1);
                Op::new(Inst::Jnz, jz + 1)
            }
        };

        v.push(op);
    }

    // The program has ended, but we still haven't found a match for some `[`,
    // this is not a valid BF program.
    if let Some(&index) = jump_stack.last() {
        return Err(CompileError::UnmatchedOpen { index });
    }

    v.shrink_to_fit();
    debug!(source_len, instructions = v.len(), "compiled program");

    Ok(Program { ops: v })
}

/// Consumes all tokens equal to `t` that follow it, returns the length of the whole run
/// (including the already consumed `t`).
fn run(t: Token, source: &mut Peekable<Lexer>) -> Addr {
    let mut count = 1;
    while source.next_if_eq(&t).is_some() {
        count += 1;
    }

    count
}
