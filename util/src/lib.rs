use std::{error::Error, fmt};

/// Byte order used when the assembler emits immediates and addresses into a `.bc` stream.
pub type AssemblerEndian = byteorder::LittleEndian;

/// Byte order used for typed loads and stores against VM memory.
///
/// These two aliases are deliberately different types: the on-disk encoding and the
/// in-memory typed access are not the same endianness, and keeping them as distinct aliases
/// makes it a type error to accidentally use one where the other belongs.
pub type MemoryEndian = byteorder::BigEndian;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseEnumError {
    pub value: String,
    pub enum_name: &'static str,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Failed to parse \"{}\" as {}.",
            &self.value, &self.enum_name
        )
    }
}

impl Error for ParseEnumError {}

pub trait EnumFromStr: Sized {
    fn from_str(s: &str) -> Result<Self, ParseEnumError>;
}
