//! The `vcpu` crate is the core of the stack-and-register virtual machine: the instruction
//! set catalog ([`opcode`]), the flat memory model ([`memory`]), the register file
//! ([`register`]), the fetch-decode-dispatch execution engine ([`processor`]), and the
//! disassembler ([`disassemble`]).
//!
//! This crate has no file I/O and no CLI surface. Those live in [`vasm`](../vasm/index.html)
//! (the assembler) and `vex` (the `vm`/`disasm` binaries), which both depend on this crate for
//! the ISA it defines.

#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod disassemble;
pub mod error;
pub mod memory;
pub mod opcode;
pub mod processor;
pub mod register;

pub use disassemble::Instruction;
pub use error::{Fault, Interrupt};
pub use memory::Memory;
pub use opcode::{Entry, Opcode, OperandKind};
pub use processor::Processor;
pub use register::{RegisterId, Registers};

#[cfg(test)]
mod test;
