use thiserror::Error;

use crate::opcode::Opcode;

/// Everything that can go wrong while executing a single step.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Memory access at {address:#06X} is out of bounds.")]
    Memory { address: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("Unknown opcode {opcode:#06X} found at location {pc:#06X}.")]
    UnknownOpcode { opcode: Opcode, pc: usize },
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

/// Errors raised while placing a program into memory.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum LoadError {
    #[error("File too big to fit in memory, {len} bytes given but only less then {capacity} are allowed.")]
    ProgramTooLarge { len: usize, capacity: usize },
}
