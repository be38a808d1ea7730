use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::compiler::{
    Addr,
    Inst::{self, *},
    Op, Program,
};

/// Number of cells on the tape.
pub const TAPE_LEN: usize = 30_000;

/// Things that can go wrong while running a program.
///
/// All of these stop the program, the tape is left as it was before the failing instruction.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// [`DecPtr`] would move the data pointer left of the first cell.
    #[error("memory underflow at instruction {ip}: cannot move {amount} left of cell {ptr}")]
    MemoryUnderflow { ip: Addr, ptr: usize, amount: usize },

    /// [`IncPtr`] would move the data pointer past the last cell.
    #[error("memory overflow at instruction {ip}: cannot move {amount} right of cell {ptr}")]
    MemoryOverflow { ip: Addr, ptr: usize, amount: usize },

    /// The instruction isn't implemented (that's [`Inp`]).
    #[error("operation not implemented at instruction {ip}: `{}`", .inst.symbol())]
    Unsupported { ip: Addr, inst: Inst },

    /// Output couldn't be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

#[allow(non_snake_case)]
pub fn Interpreter<'io>(program: Program, output: &'io mut dyn Write) -> Interpreter<'io> {
    Interpreter {
        program,
        cursor: 0,
        data: vec![0; TAPE_LEN].into_boxed_slice(),
        ptr: 0,
        output,
    }
}

pub struct Interpreter<'io> {
    program: Program,
    cursor: Addr,

    // Always `TAPE_LEN` long
    data: Box<[u8]>,
    ptr: usize,

    output: &'io mut dyn Write,
}

impl Interpreter<'_> {
    /// Run the program till completion.
    ///
    /// Output is flushed even if the program fails.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        debug!(instructions = self.program.len(), "running program");

        let mut steps = 0u64;
        let res = loop {
            match self.step() {
                Ok(true) => break Ok(()),
                Ok(false) => steps += 1,
                Err(e) => break Err(e),
            }
        };

        debug!(steps, ok = res.is_ok(), "program stopped");

        let flushed = self.output.flush();
        res?;
        flushed?;

        Ok(())
    }

    /// Run the current instruction.
    ///
    /// Returns `true` if the program is already complete, in which case nothing is run.
    pub fn step(&mut self) -> Result<bool, RuntimeError> {
        let Some(&Op { inst, arg }) = self.program.get(self.cursor) else {
            return Ok(true);
        };

        match inst {
            IncPtr => self.inc_ptr(arg)?,
            DecPtr => self.dec_ptr(arg)?,
            Inc => self.inc(arg),
            Dec => self.dec(arg),
            Out => self.out(arg)?,
            Inp => self.inp()?,
            Jz => self.jz(arg),
            Jnz => self.jnz(arg),
        }

        Ok(false)
    }

    /// Returns true if the program has run to completion.
    pub fn is_done(&self) -> bool {
        self.cursor >= self.program.len()
    }

    /// Returns the instruction pointer.
    pub fn cursor(&self) -> Addr {
        self.cursor
    }

    /// Returns the data pointer.
    pub fn ptr(&self) -> usize {
        self.ptr
    }

    pub fn tape(&self) -> &[u8] {
        &self.data
    }

    /// Move to the next instruction.
    fn next(&mut self) {
        self.cursor += 1;
    }

    /// Handle the [`IncPtr`] instruction.
    fn inc_ptr(&mut self, amount: usize) -> Result<(), RuntimeError> {
        debug_assert!(self.at(IncPtr));

        match self.ptr.checked_add(amount) {
            Some(ptr) if ptr < self.data.len() => self.ptr = ptr,
            _ => {
                return Err(RuntimeError::MemoryOverflow {
                    ip: self.cursor,
                    ptr: self.ptr,
                    amount,
                })
            }
        }

        self.next();
        Ok(())
    }

    /// Handle the [`DecPtr`] instruction.
    fn dec_ptr(&mut self, amount: usize) -> Result<(), RuntimeError> {
        debug_assert!(self.at(DecPtr));

        let Some(ptr) = self.ptr.checked_sub(amount) else {
            return Err(RuntimeError::MemoryUnderflow {
                ip: self.cursor,
                ptr: self.ptr,
                amount,
            });
        };

        self.ptr = ptr;
        self.next();
        Ok(())
    }

    /// Handle the [`Inc`] instruction.
    fn inc(&mut self, times: usize) {
        debug_assert!(self.at(Inc));

        let byte = self.deref_mut();
        *byte = byte.wrapping_add(times as u8);
        self.next();
    }

    /// Handle the [`Dec`] instruction.
    fn dec(&mut self, times: usize) {
        debug_assert!(self.at(Dec));

        let byte = self.deref_mut();
        *byte = byte.wrapping_sub(times as u8);
        self.next();
    }

    /// Handle the [`Out`] instruction.
    fn out(&mut self, times: usize) -> Result<(), RuntimeError> {
        debug_assert!(self.at(Out));

        let byte = self.deref();
        io::copy(&mut io::repeat(byte).take(times as u64), &mut self.output)?;
        self.next();
        Ok(())
    }

    /// Handle the [`Inp`] instruction.
    fn inp(&mut self) -> Result<(), RuntimeError> {
        debug_assert!(self.at(Inp));

        trace!(ip = self.cursor, "reached input instruction");
        Err(RuntimeError::Unsupported {
            ip: self.cursor,
            inst: Inp,
        })
    }

    /// Handle the [`Jz`] instruction.
    fn jz(&mut self, addr: Addr) {
        debug_assert!(self.at(Jz));

        if self.deref() == 0 {
            self.cursor = addr;
        } else {
            self.next();
        }
    }

    /// Handle the [`Jnz`] instruction.
    fn jnz(&mut self, addr: Addr) {
        debug_assert!(self.at(Jnz));

        if self.deref() != 0 {
            self.cursor = addr;
        } else {
            self.next();
        }
    }

    /// Returns the byte at the data pointer.
    fn deref(&self) -> u8 {
        self.data[self.ptr]
    }

    /// Returns a unique reference to the byte at the data pointer, allowing to mutate it.
    fn deref_mut(&mut self) -> &mut u8 {
        &mut self.data[self.ptr]
    }

    /// Returns true if the current instruction is `i`.
    fn at(&self, i: Inst) -> bool {
        self.program
            .get(self.cursor)
            .is_some_and(|op| op.inst == i)
    }
}
