use thiserror::Error;

/// VM-time errors that halt the dispatch loop immediately. A single enum covers every fatal
/// condition, since this ISA has no separate "halted normally" exit code distinct from the
/// `EXIT` register value.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    #[error("opcode byte {0:#04x} does not name a known instruction")]
    InvalidOpcode(u8),

    #[error("memory access at address {address} of size {size} is out of bounds (capacity {capacity})")]
    OutOfBounds {
        address: u64,
        size: u8,
        capacity: u64,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("`handled_size` byte {0} is not one of 1, 2, 4, 8")]
    InvalidHandledSize(u8),

    #[error("register index {0} does not name a register")]
    InvalidRegister(u8),
}

/// Soft, VM-time errors reported through the `ERROR` register rather than halting execution.
/// Cleared at the start of every instruction dispatch (see [`crate::register::RegisterId::Error`]).
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    #[error("no error")]
    NoError = 0,
    #[error("end of file")]
    EndOfFile = 1,
    #[error("invalid input")]
    InvalidInput = 2,
    #[error("generic error")]
    GenericError = 3,
}

impl Interrupt {
    pub fn code(self) -> i64 {
        self as i64
    }
}
