//! Assembler for the [vcpu](../vcpu/index.html) virtual processor.
//!
//! [`assemble`] translates one VASM source program into the flat, headerless bytecode stream
//! that `vex`'s `vm` binary loads and executes, and that `vexfile` reads and writes to disk.
//!
//! # VASM assembly language
//!
//! One statement per line: a comment, a label definition, an instruction, or nothing. A
//! comment starts with `;` and runs to the end of the line.
//!
//! ## Registers
//!
//! Register operands are named (no `$`-prefix, unlike some assembly dialects):
//!
//! Name  | Purpose
//! ------|--------
//! `a`, `b`, `c`, `d` | General-purpose.
//! `exit`  | Process exit status; also the target of the `exit` instruction.
//! `input` | Destination of `inint`/`instr`.
//! `error` | Soft I/O error taxonomy, cleared at the start of every dispatch.
//! `print` | Source of `prt`/`prtstr`.
//! `sp`    | Stack pointer.
//! `pc`    | Program counter.
//! `zf`, `sf`, `rf` | Zero, sign, and remainder flags.
//!
//! ## Operands
//!
//! Syntax    | Meaning
//! ----------|--------
//! `reg`     | The register's full 64-bit value.
//! `[reg]`   | The memory at the address held in `reg`.
//! `123`, `0x7B` | A decimal or hexadecimal immediate.
//! `[123]`, `[0x7B]` | A literal memory address.
//! `name`    | A label reference (any name that isn't a register mnemonic).
//!
//! ## Mnemonics
//!
//! Arithmetic `add sub mul div mod`; counting `inc[1248] dec[1248]`; `nop`; memory
//! `mov[1248]`; stack `push[1248] pop[1248]`; control flow `@name jmp cjmp njmp`; compare
//! `cmp[1248]`; I/O `prt prtstr inint instr`; `exit`. Mnemonics whose family carries a
//! `handled_size` byte take a bracketed digit suffix (`1`, `2`, `4`, or `8`); mnemonics without
//! one never do. See [`vcpu::opcode::encoding_table`] for the full addressing-mode table.
//!
//! ## Labels
//!
//! `@name` on its own line defines a label at the byte offset of the instruction that
//! follows it. `jmp`/`cjmp`/`njmp` resolve a label name to that offset; forward references are
//! allowed, since every instruction's byte width is known from its opcode and `handled_size`
//! alone, independent of any operand's value.

mod encoder;
mod error;
mod labels;
mod parser;
mod tokenizer;


pub use error::Error;
pub use parser::Rule;

pub type Result<T> = std::result::Result<T, Error>;

/// Assembles a complete VASM source program into a flat bytecode stream.
///
/// ```
/// let bytecode = vasm::assemble("mov8 a, 7\nmov8 b, 35\nadd\nmov8 exit, a\nexit\n").unwrap();
/// assert_eq!(bytecode.first(), Some(&(vcpu::Opcode::MoveRegConst as u8)));
/// ```
pub fn assemble(source: &str) -> Result<Vec<u8>> {
    encoder::assemble(source)
}
