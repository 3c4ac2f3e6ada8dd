use crate::constants::REGISTER_COUNT;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::ToPrimitive;
use std::fmt;
use std::ops::{Index, IndexMut};
use util::{EnumFromStr, ParseEnumError};

/// The thirteen named register-file slots. Index order is part of the bytecode ABI: a
/// register operand byte is this enum's ordinal, not a name.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum RegisterId {
    A,
    B,
    C,
    D,
    Exit,
    Input,
    Error,
    Print,
    StackPointer,
    ProgramCounter,
    ZeroFlag,
    SignFlag,
    RemainderFlag,
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl EnumFromStr for RegisterId {
    fn from_str(s: &str) -> Result<RegisterId, ParseEnumError> {
        use RegisterId::*;
        match s {
            "a" => Ok(A),
            "b" => Ok(B),
            "c" => Ok(C),
            "d" => Ok(D),
            "exit" => Ok(Exit),
            "input" => Ok(Input),
            "error" => Ok(Error),
            "print" => Ok(Print),
            "sp" => Ok(StackPointer),
            "pc" => Ok(ProgramCounter),
            "zf" => Ok(ZeroFlag),
            "sf" => Ok(SignFlag),
            "rf" => Ok(RemainderFlag),
            _ => Err(ParseEnumError {
                value: s.to_owned(),
                enum_name: "RegisterId",
            }),
        }
    }
}

#[inline]
pub fn register_index(id: RegisterId) -> usize {
    id.to_usize().unwrap()
}

/// The mnemonic a register is spelled with in assembly source — the inverse of
/// [`EnumFromStr::from_str`]. Used by the disassembler to render register operands.
pub fn mnemonic(id: RegisterId) -> &'static str {
    use RegisterId::*;
    match id {
        A => "a",
        B => "b",
        C => "c",
        D => "d",
        Exit => "exit",
        Input => "input",
        Error => "error",
        Print => "print",
        StackPointer => "sp",
        ProgramCounter => "pc",
        ZeroFlag => "zf",
        SignFlag => "sf",
        RemainderFlag => "rf",
    }
}

/// Fixed-size bank of 64-bit signed register slots, indexable by [`RegisterId`] or by its
/// raw byte-encoded index.
///
/// ```
/// use vcpu::register::{RegisterId, Registers};
///
/// let mut registers = Registers::default();
/// registers[RegisterId::A] = 42;
/// assert_eq!(registers[RegisterId::A], 42);
/// ```
#[derive(Clone, Copy)]
pub struct Registers {
    slots: [i64; REGISTER_COUNT],
}

impl Registers {
    pub fn new() -> Registers {
        Registers {
            slots: [0; REGISTER_COUNT],
        }
    }

    /// Looks up a register by its raw bytecode index.
    ///
    /// ```
    /// use vcpu::register::{RegisterId, Registers};
    ///
    /// let registers = Registers::default();
    /// assert_eq!(registers.by_index(0), Some(0));
    /// assert_eq!(registers.by_index(13), None);
    /// ```
    pub fn by_index(&self, index: u8) -> Option<i64> {
        self.slots.get(index as usize).copied()
    }

    pub fn set_by_index(&mut self, index: u8, value: i64) -> Option<()> {
        let slot = self.slots.get_mut(index as usize)?;
        *slot = value;
        Some(())
    }

    pub fn flag(&self, id: RegisterId) -> bool {
        self[id] != 0
    }

    pub fn set_flag(&mut self, id: RegisterId, value: bool) {
        self[id] = value as i64;
    }

    /// Sets `ZeroFlag`/`SignFlag` from a freshly computed arithmetic or compare result, and
    /// clears `RemainderFlag`. Callers that produce a remainder (`DIV`) set it separately.
    pub fn set_arithmetic_flags(&mut self, result: i64) {
        self.set_flag(RegisterId::ZeroFlag, result == 0);
        self.set_flag(RegisterId::SignFlag, result < 0);
        self[RegisterId::RemainderFlag] = 0;
    }
}

impl Default for Registers {
    fn default() -> Registers {
        Registers::new()
    }
}

impl Index<RegisterId> for Registers {
    type Output = i64;

    fn index(&self, id: RegisterId) -> &i64 {
        &self.slots[register_index(id)]
    }
}

impl IndexMut<RegisterId> for Registers {
    fn index_mut(&mut self, id: RegisterId) -> &mut i64 {
        &mut self.slots[register_index(id)]
    }
}
