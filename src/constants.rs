use std::mem;

/// Default capacity, in bytes, of a freshly constructed [`crate::memory::Memory`].
pub const DEFAULT_MEMORY_SIZE: usize = 1024;

/// Number of named slots in the register file. See [`crate::register::RegisterId`].
pub const REGISTER_COUNT: usize = 13;

pub const BYTE_BYTES: usize = mem::size_of::<u8>();
pub const HALF_BYTES: usize = mem::size_of::<u16>();
pub const WORD_BYTES: usize = mem::size_of::<u32>();
pub const LONG_BYTES: usize = mem::size_of::<u64>();

/// A register slot, an address, and a jump target are all this wide.
pub const REGISTER_BYTES: usize = LONG_BYTES;

/// Widths legal for a `handled_size` byte.
pub const VALID_SIZES: [u8; 4] = [1, 2, 4, 8];

pub fn is_valid_size(size: u8) -> bool {
    VALID_SIZES.contains(&size)
}
