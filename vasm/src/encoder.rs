//! Two-pass encoder: pass one walks every line, sizing each instruction from its
//! `(opcode, handled_size)` alone and recording label offsets as they're defined; pass two
//! emits bytes, substituting label references with the offsets pass one recorded. Forward
//! references work because instruction width never depends on an operand's *value*, only on
//! its *kind*.

use std::collections::HashMap;

use byteorder::ByteOrder;
use pest::Parser;
use util::AssemblerEndian;
use vcpu::opcode::{encoding_table, operand_byte_width, Entry, OperandKind};

use crate::error::Error;
use crate::labels::LabelMap;
use crate::parser::{Rule, VasmParser};
use crate::tokenizer::{tokenize_operand, RawOperand};

/// Flat `(mnemonic, operand kinds) -> (opcode, size)` table, denser and easier to audit for
/// gaps than a lookup nested by operand position. Reuses `vcpu`'s own `encoding_table`, which
/// is the single source of truth the execution engine's decode table is also built from.
type Table = HashMap<(String, Vec<OperandKind>), Entry>;

fn build_table() -> Table {
    encoding_table()
        .into_iter()
        .map(|entry| ((entry.mnemonic.clone(), entry.operands.to_vec()), entry))
        .collect()
}

/// Strips one trailing size-suffix digit (`1`, `2`, `4`, `8`) off a mnemonic, if present.
fn strip_size_suffix(mnemonic: &str) -> Option<&str> {
    let last = mnemonic.chars().last()?;
    if matches!(last, '1' | '2' | '4' | '8') {
        Some(&mnemonic[..mnemonic.len() - 1])
    } else {
        None
    }
}

/// Resolves a mnemonic and operand-kind tuple to a table entry. A sized mnemonic applied to an
/// operand combination that only exists in unsized form (e.g. `mov8 exit, a`, a plain
/// register-to-register copy) is accepted by falling back to the unsized row — `MOVE_REG_REG`
/// and `COMPARE_REG_REG` carry no `handled_size` byte, so the suffix the author typed is
/// redundant rather than contradictory.
fn resolve_entry<'t>(
    table: &'t Table,
    mnemonic: &str,
    kinds: &[OperandKind],
) -> Option<&'t Entry> {
    if let Some(entry) = table.get(&(mnemonic.to_string(), kinds.to_vec())) {
        return Some(entry);
    }
    let stripped = strip_size_suffix(mnemonic)?;
    table
        .get(&(stripped.to_string(), kinds.to_vec()))
        .filter(|entry| entry.size == 0)
}

struct ParsedInstruction<'i> {
    line: usize,
    entry: Entry,
    operands: Vec<RawOperand<'i>>,
}

fn instruction_byte_len(entry: &Entry) -> u64 {
    let mut len = 1u64; // opcode byte
    if entry.size != 0 {
        len += 1; // handled_size byte
    }
    for &kind in entry.operands {
        len += u64::from(operand_byte_width(kind, entry.size));
    }
    len
}

fn write_le(out: &mut Vec<u8>, value: u64, size: u8) {
    let mut buf = [0u8; 8];
    AssemblerEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf[..size as usize]);
}

fn emit(out: &mut Vec<u8>, instr: &ParsedInstruction, labels: &LabelMap) -> Result<(), Error> {
    out.push(instr.entry.opcode as u8);
    if instr.entry.size != 0 {
        out.push(instr.entry.size);
    }

    for (&kind, operand) in instr.entry.operands.iter().zip(instr.operands.iter()) {
        match operand {
            RawOperand::Register(id) => out.push(*id as u8),
            RawOperand::AddressInRegister(id) => out.push(*id as u8),
            RawOperand::Number(value) => {
                let size = operand_byte_width(kind, instr.entry.size);
                if size < 8 && *value >= (1u64 << (size * 8)) {
                    return Err(Error::NumberTooWide {
                        line: instr.line,
                        value: *value,
                        size,
                    });
                }
                write_le(out, *value, size);
            }
            RawOperand::AddressLiteral(value) => write_le(out, *value, 8),
            RawOperand::Label(span) => {
                let name = span.as_str();
                let target = *labels.get(name).ok_or_else(|| Error::UnresolvedLabel {
                    line: instr.line,
                    label: name.to_string(),
                })?;
                write_le(out, target, 8);
            }
        }
    }

    Ok(())
}

/// Assembles `source`, a complete VASM program, into a flat bytecode stream.
pub fn assemble(source: &str) -> Result<Vec<u8>, Error> {
    let table = build_table();

    let mut program_pairs = VasmParser::parse(Rule::program, source)?;
    let lines = program_pairs.next().unwrap().into_inner();

    let mut labels: LabelMap = HashMap::new();
    let mut parsed: Vec<ParsedInstruction> = Vec::new();
    let mut offset: u64 = 0;

    for pair in lines {
        match pair.as_rule() {
            Rule::EOI => break,
            Rule::label => {
                let line = pair.as_span().start_pos().line_col().0;
                let name_pair = pair.into_inner().next().unwrap();
                let name = name_pair.as_str().to_string();
                if labels.insert(name.clone(), offset).is_some() {
                    return Err(Error::DuplicateLabel { line, label: name });
                }
            }
            Rule::instruction => {
                let line = pair.as_span().start_pos().line_col().0;
                let mut inner = pair.into_inner();
                let mnemonic = inner.next().unwrap().as_str().to_string();

                let mut operands = Vec::new();
                for operand_pair in inner {
                    operands.push(tokenize_operand(operand_pair)?);
                }
                let kinds: Vec<OperandKind> = operands.iter().map(RawOperand::kind).collect();

                let entry = resolve_entry(&table, &mnemonic, &kinds)
                    .cloned()
                    .ok_or_else(|| Error::IllegalOperands {
                        line,
                        mnemonic: mnemonic.clone(),
                        operands: kinds,
                    })?;

                offset += instruction_byte_len(&entry);
                parsed.push(ParsedInstruction {
                    line,
                    entry,
                    operands,
                });
            }
            _ => unreachable!("program only contains label, instruction and EOI"),
        }
    }

    let mut bytecode = Vec::new();
    for instr in &parsed {
        emit(&mut bytecode, instr, &labels)?;
    }

    Ok(bytecode)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_mnemonic_is_an_error() {
        let err = assemble("frobnicate a\n").unwrap_err();
        assert!(matches!(err, Error::IllegalOperands { .. }));
    }

    #[test]
    fn sized_suffix_on_a_register_move_falls_back_to_the_unsized_opcode() {
        let bytecode = assemble("mov8 exit, a\n").unwrap();
        assert_eq!(bytecode, vec![vcpu::Opcode::MoveRegReg as u8, 4, 0]);
    }

    #[test]
    fn duplicate_label_is_an_error() {
        let err = assemble("@top\nnop\n@top\nnop\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { .. }));
    }

    #[test]
    fn unresolved_label_is_an_error() {
        let err = assemble("jmp nowhere\n").unwrap_err();
        assert!(matches!(err, Error::UnresolvedLabel { .. }));
    }

    #[test]
    fn number_too_wide_for_its_field_is_an_error() {
        let err = assemble("mov1 a, 1000\n").unwrap_err();
        assert!(matches!(err, Error::NumberTooWide { .. }));
    }

    #[test]
    fn forward_jump_resolves_to_the_following_instruction() {
        let bytecode = assemble("jmp ahead\n@ahead\nexit\n").unwrap();
        // jmp = opcode(1) + target(8); its target must equal the exit opcode's own offset (9).
        assert_eq!(bytecode[0], vcpu::Opcode::Jump as u8);
        let target = u64::from_le_bytes(bytecode[1..9].try_into().unwrap());
        assert_eq!(target, 9);
        assert_eq!(bytecode[9], vcpu::Opcode::Exit as u8);
    }
}
