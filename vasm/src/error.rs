use thiserror::Error;
use vcpu::OperandKind;

use crate::parser::Rule;

/// Assembler-time errors. Every variant carries the 1-based source line it was raised on, so
/// the CLI can print a diagnostic that names both the line and the offending token (see
/// `main.rs`). All of these are fatal: the assembler stops at the first one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] pest::error::Error<Rule>),

    #[error("line {line}: \"{mnemonic}\" does not accept operands of kind {operands:?}")]
    IllegalOperands {
        line: usize,
        mnemonic: String,
        operands: Vec<OperandKind>,
    },

    #[error("line {line}: label \"{label}\" is not defined")]
    UnresolvedLabel { line: usize, label: String },

    #[error("line {line}: label \"{label}\" is already defined")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: number {value} does not fit in {size} byte(s)")]
    NumberTooWide { line: usize, value: u64, size: u8 },

    #[error("line {line}: \"{name}\" is not a register")]
    NotARegister { line: usize, name: String },

    #[error("line {line}: malformed number literal \"{text}\"")]
    MalformedNumber { line: usize, text: String },
}
