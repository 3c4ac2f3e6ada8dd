//! Inverse of the assembler's encoder: walks a bytecode stream and renders it back to
//! annotated assembly text. No direct teacher analog — `vcpu` has no encoder of its own to
//! invert, so this walks the same [`crate::opcode::decode`] table the engine's fetch loop
//! consults, in the opposite direction.

use byteorder::ByteOrder;
use num_traits::FromPrimitive;
use util::AssemblerEndian;

use crate::error::Fault;
use crate::opcode::{decode, operand_byte_width, Opcode, OperandKind};
use crate::register::{self, RegisterId};

/// One decoded instruction: its address, rendered mnemonic (with size suffix when sized), and
/// rendered operand strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub address: u64,
    pub mnemonic: String,
    pub operands: Vec<String>,
}

/// Walks `bytecode` end to end, decoding one instruction at a time.
///
/// Fails if a byte is not a known opcode, if `Opcode::Label` is encountered (it is never
/// emitted into a bytecode stream), or if the stream is truncated mid-instruction.
pub fn disassemble(bytecode: &[u8]) -> Result<Vec<Instruction>, Fault> {
    let mut instructions = Vec::new();
    let mut cursor = 0usize;

    while cursor < bytecode.len() {
        let address = cursor as u64;
        let opcode_byte = read_u8(bytecode, cursor)?;
        cursor += 1;

        let opcode = Opcode::from_u8(opcode_byte).ok_or(Fault::InvalidOpcode(opcode_byte))?;
        if opcode == Opcode::Label {
            return Err(Fault::InvalidOpcode(opcode_byte));
        }

        let entry = decode(opcode);

        let mut mnemonic = entry.mnemonic_base.to_string();
        let handled_size = if entry.sized {
            let size = read_u8(bytecode, cursor)?;
            cursor += 1;
            mnemonic.push_str(&size.to_string());
            size
        } else {
            0
        };

        let mut operands = Vec::with_capacity(entry.operands.len());
        for &kind in entry.operands {
            let width = operand_byte_width(kind, handled_size) as usize;
            let end = cursor
                .checked_add(width)
                .filter(|&end| end <= bytecode.len())
                .ok_or(Fault::OutOfBounds {
                    address: cursor as u64,
                    size: width as u8,
                    capacity: bytecode.len() as u64,
                })?;
            let value = AssemblerEndian::read_uint(&bytecode[cursor..end], width);
            cursor = end;
            operands.push(render_operand(kind, value)?);
        }

        instructions.push(Instruction {
            address,
            mnemonic,
            operands,
        });
    }

    Ok(instructions)
}

fn read_u8(bytecode: &[u8], cursor: usize) -> Result<u8, Fault> {
    bytecode.get(cursor).copied().ok_or(Fault::OutOfBounds {
        address: cursor as u64,
        size: 1,
        capacity: bytecode.len() as u64,
    })
}

fn render_operand(kind: OperandKind, value: u64) -> Result<String, Fault> {
    Ok(match kind {
        OperandKind::Register => {
            let id = RegisterId::from_u64(value).ok_or(Fault::InvalidRegister(value as u8))?;
            register::mnemonic(id).to_string()
        }
        OperandKind::AddressInRegister => {
            let id = RegisterId::from_u64(value).ok_or(Fault::InvalidRegister(value as u8))?;
            format!("[{}]", register::mnemonic(id))
        }
        OperandKind::Number => value.to_string(),
        OperandKind::AddressLiteral => format!("[0x{:x}]", value),
        // Jump targets are resolved addresses by the time they reach bytecode; the disassembler
        // has no label table to reconstruct names from, so it prints the raw address.
        OperandKind::Label => format!("0x{:x}", value),
    })
}

/// Renders a full disassembly as one line per instruction, `mnemonic operand, operand`.
pub fn render(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str(&instruction.mnemonic);
        if !instruction.operands.is_empty() {
            out.push(' ');
            out.push_str(&instruction.operands.join(", "));
        }
        out.push('\n');
    }
    out
}
