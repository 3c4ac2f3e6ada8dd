use num_derive::{FromPrimitive, ToPrimitive};
use std::fmt;

/// The complete instruction set, in ABI order. Byte value is this enum's ordinal.
///
/// `Label` is a pseudo-op: the assembler consumes it to record a label offset and never
/// emits it into a bytecode stream, so the execution engine never dispatches on it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    IncReg,
    IncAddrInReg,
    IncAddrLiteral,
    DecReg,
    DecAddrInReg,
    DecAddrLiteral,
    NoOperation,
    MoveRegReg,
    MoveRegAddrInReg,
    MoveRegConst,
    MoveRegAddrLiteral,
    MoveAddrInRegReg,
    MoveAddrInRegAddrInReg,
    MoveAddrInRegConst,
    MoveAddrInRegAddrLiteral,
    MoveAddrLiteralReg,
    MoveAddrLiteralAddrInReg,
    MoveAddrLiteralConst,
    MoveAddrLiteralAddrLiteral,
    PushReg,
    PushAddrInReg,
    PushConst,
    PushAddrLiteral,
    PopReg,
    PopAddrInReg,
    PopAddrLiteral,
    Label,
    Jump,
    JumpIfTrueReg,
    JumpIfFalseReg,
    CompareRegReg,
    CompareRegConst,
    CompareConstReg,
    CompareConstConst,
    Print,
    PrintString,
    InputInt,
    InputString,
    Exit,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Opcode {
    /// Whether this opcode carries a `handled_size` byte immediately after itself.
    pub fn is_sized(self) -> bool {
        use Opcode::*;
        !matches!(
            self,
            Add | Sub
                | Mul
                | Div
                | Mod
                | IncReg
                | DecReg
                | NoOperation
                | MoveRegReg
                | PushReg
                | PopReg
                | Label
                | Jump
                | JumpIfTrueReg
                | JumpIfFalseReg
                | CompareRegReg
                | Print
                | PrintString
                | InputInt
                | InputString
                | Exit
        )
    }

    /// Whether this opcode's first operand is a jump target resolved through the label map.
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfTrueReg | Opcode::JumpIfFalseReg)
    }
}

/// The kind of a single tokenized operand. Discriminants are the canonical ordering used to
/// key the addressing-mode table (`REGISTER=0, ADDRESS_IN_REGISTER=1, NUMBER=2,
/// ADDRESS_LITERAL=3, LABEL=4`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum OperandKind {
    Register = 0,
    AddressInRegister = 1,
    Number = 2,
    AddressLiteral = 3,
    Label = 4,
}

/// One row of the addressing-mode table: a mnemonic plus the operand-kind tuple it accepts,
/// resolving to a concrete opcode and the size it is emitted with (`0` when the opcode
/// carries no `handled_size` byte).
#[derive(Clone, Debug)]
pub struct Entry {
    pub mnemonic: String,
    pub operands: &'static [OperandKind],
    pub opcode: Opcode,
    pub size: u8,
}

use OperandKind::{AddressInRegister as Air, AddressLiteral as Al, Label as Lb, Number as Nu, Register as Rg};

/// Builds the full addressing-mode table: every legal `(mnemonic, operand kinds)` combination
/// this ISA accepts, resolved to the opcode and `handled_size` it encodes to.
///
/// This is a flat `(mnemonic, operand kinds) -> (opcode, size)` table rather than the
/// original nested-by-position lookup: every legal combination is one row, and a missing
/// row is a compile-time-visible gap instead of a `None` buried three levels deep.
pub fn encoding_table() -> Vec<Entry> {
    let mut table = Vec::new();

    macro_rules! row {
        ($mnemonic:expr, [$($kind:expr),*], $opcode:expr, $size:expr) => {
            table.push(Entry {
                mnemonic: $mnemonic.to_string(),
                operands: &[$($kind),*],
                opcode: $opcode,
                size: $size,
            });
        };
    }

    // Arity-0 operators.
    row!("add", [], Opcode::Add, 0);
    row!("sub", [], Opcode::Sub, 0);
    row!("mul", [], Opcode::Mul, 0);
    row!("div", [], Opcode::Div, 0);
    row!("mod", [], Opcode::Mod, 0);
    row!("nop", [], Opcode::NoOperation, 0);
    row!("prt", [], Opcode::Print, 0);
    row!("prtstr", [], Opcode::PrintString, 0);
    row!("inint", [], Opcode::InputInt, 0);
    row!("instr", [], Opcode::InputString, 0);
    row!("exit", [], Opcode::Exit, 0);

    // Arity-1, register-only, full register width (no size prefix).
    row!("inc", [Rg], Opcode::IncReg, 0);
    row!("dec", [Rg], Opcode::DecReg, 0);
    row!("push", [Rg], Opcode::PushReg, 0);
    row!("pop", [Rg], Opcode::PopReg, 0);

    // Bare register-register forms.
    row!("mov", [Rg, Rg], Opcode::MoveRegReg, 0);
    row!("cmp", [Rg, Rg], Opcode::CompareRegReg, 0);

    // Control flow.
    row!("jmp", [Lb], Opcode::Jump, 0);
    row!("cjmp", [Lb, Rg], Opcode::JumpIfTrueReg, 0);
    row!("njmp", [Lb, Rg], Opcode::JumpIfFalseReg, 0);
    row!("@", [Lb], Opcode::Label, 0);

    for &size in &crate::constants::VALID_SIZES {
        let suffix = size.to_string();

        // inc{size}/dec{size}: memory targets only.
        row!(
            format!("inc{}", suffix),
            [Air],
            Opcode::IncAddrInReg,
            size
        );
        row!(
            format!("inc{}", suffix),
            [Al],
            Opcode::IncAddrLiteral,
            size
        );
        row!(
            format!("dec{}", suffix),
            [Air],
            Opcode::DecAddrInReg,
            size
        );
        row!(
            format!("dec{}", suffix),
            [Al],
            Opcode::DecAddrLiteral,
            size
        );

        // push{size}: any source except a bare register (that's the unsized form above).
        row!(
            format!("push{}", suffix),
            [Air],
            Opcode::PushAddrInReg,
            size
        );
        row!(
            format!("push{}", suffix),
            [Nu],
            Opcode::PushConst,
            size
        );
        row!(
            format!("push{}", suffix),
            [Al],
            Opcode::PushAddrLiteral,
            size
        );

        // pop{size}: memory destinations only.
        row!(
            format!("pop{}", suffix),
            [Air],
            Opcode::PopAddrInReg,
            size
        );
        row!(
            format!("pop{}", suffix),
            [Al],
            Opcode::PopAddrLiteral,
            size
        );

        // mov{size}: every destination/source combination except reg-reg (handled unsized).
        let mov = format!("mov{}", suffix);
        row!(mov, [Rg, Air], Opcode::MoveRegAddrInReg, size);
        row!(mov, [Rg, Nu], Opcode::MoveRegConst, size);
        row!(mov, [Rg, Al], Opcode::MoveRegAddrLiteral, size);
        row!(mov, [Air, Rg], Opcode::MoveAddrInRegReg, size);
        row!(mov, [Air, Air], Opcode::MoveAddrInRegAddrInReg, size);
        row!(mov, [Air, Nu], Opcode::MoveAddrInRegConst, size);
        row!(mov, [Air, Al], Opcode::MoveAddrInRegAddrLiteral, size);
        row!(mov, [Al, Rg], Opcode::MoveAddrLiteralReg, size);
        row!(mov, [Al, Air], Opcode::MoveAddrLiteralAddrInReg, size);
        row!(mov, [Al, Nu], Opcode::MoveAddrLiteralConst, size);
        row!(mov, [Al, Al], Opcode::MoveAddrLiteralAddrLiteral, size);

        // cmp{size}: reg-reg stays unsized; only combinations involving a constant are sized.
        let cmp = format!("cmp{}", suffix);
        row!(cmp, [Rg, Nu], Opcode::CompareRegConst, size);
        row!(cmp, [Nu, Rg], Opcode::CompareConstReg, size);
        row!(cmp, [Nu, Nu], Opcode::CompareConstConst, size);
    }

    table
}

/// Byte width of one operand slot of the given kind, given the instruction's `handled_size`
/// (0 for unsized instructions). `Number` is the only kind whose width depends on
/// `handled_size`; every other kind has a fixed width dictated by the ABI (register indexes
/// and `handled_size` are always one byte, addresses and jump targets are always eight).
pub fn operand_byte_width(kind: OperandKind, handled_size: u8) -> u8 {
    match kind {
        OperandKind::Register => 1,
        OperandKind::AddressInRegister => 1,
        OperandKind::Number => handled_size,
        OperandKind::AddressLiteral => 8,
        OperandKind::Label => 8,
    }
}

/// One row of the disassembler's decode table: the inverse of [`encoding_table`], indexed by
/// opcode rather than by mnemonic. `mnemonic_base` excludes the numeric size suffix; the
/// disassembler appends `handled_size` itself when `sized` is true.
pub struct Decode {
    pub mnemonic_base: &'static str,
    pub operands: &'static [OperandKind],
    pub sized: bool,
}

/// Looks up the decode entry for `opcode`. `Opcode::Label` has no reachable decode entry
/// since it is never emitted into a bytecode stream — it is an assembler-only pseudo-op;
/// callers must special-case it before calling this function on bytecode fetched from memory.
pub fn decode(opcode: Opcode) -> Decode {
    use Opcode::*;

    let (mnemonic_base, operands): (&'static str, &'static [OperandKind]) = match opcode {
        Add => ("add", &[]),
        Sub => ("sub", &[]),
        Mul => ("mul", &[]),
        Div => ("div", &[]),
        Mod => ("mod", &[]),
        IncReg => ("inc", &[Rg]),
        IncAddrInReg => ("inc", &[Air]),
        IncAddrLiteral => ("inc", &[Al]),
        DecReg => ("dec", &[Rg]),
        DecAddrInReg => ("dec", &[Air]),
        DecAddrLiteral => ("dec", &[Al]),
        NoOperation => ("nop", &[]),
        MoveRegReg => ("mov", &[Rg, Rg]),
        MoveRegAddrInReg => ("mov", &[Rg, Air]),
        MoveRegConst => ("mov", &[Rg, Nu]),
        MoveRegAddrLiteral => ("mov", &[Rg, Al]),
        MoveAddrInRegReg => ("mov", &[Air, Rg]),
        MoveAddrInRegAddrInReg => ("mov", &[Air, Air]),
        MoveAddrInRegConst => ("mov", &[Air, Nu]),
        MoveAddrInRegAddrLiteral => ("mov", &[Air, Al]),
        MoveAddrLiteralReg => ("mov", &[Al, Rg]),
        MoveAddrLiteralAddrInReg => ("mov", &[Al, Air]),
        MoveAddrLiteralConst => ("mov", &[Al, Nu]),
        MoveAddrLiteralAddrLiteral => ("mov", &[Al, Al]),
        PushReg => ("push", &[Rg]),
        PushAddrInReg => ("push", &[Air]),
        PushConst => ("push", &[Nu]),
        PushAddrLiteral => ("push", &[Al]),
        PopReg => ("pop", &[Rg]),
        PopAddrInReg => ("pop", &[Air]),
        PopAddrLiteral => ("pop", &[Al]),
        Label => ("@", &[Lb]),
        Jump => ("jmp", &[Lb]),
        JumpIfTrueReg => ("cjmp", &[Lb, Rg]),
        JumpIfFalseReg => ("njmp", &[Lb, Rg]),
        CompareRegReg => ("cmp", &[Rg, Rg]),
        CompareRegConst => ("cmp", &[Rg, Nu]),
        CompareConstReg => ("cmp", &[Nu, Rg]),
        CompareConstConst => ("cmp", &[Nu, Nu]),
        Print => ("prt", &[]),
        PrintString => ("prtstr", &[]),
        InputInt => ("inint", &[]),
        InputString => ("instr", &[]),
        Exit => ("exit", &[]),
    };

    Decode {
        mnemonic_base,
        operands,
        sized: opcode.is_sized(),
    }
}
