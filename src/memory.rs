use byteorder::ByteOrder;
use util::{AssemblerEndian, MemoryEndian};

use crate::error::Fault;

/// Flat, byte-addressable storage backing one VM instance.
///
/// Typed reads and writes (`read`/`write`) go through [`MemoryEndian`] (big-endian); [`blit`]
/// is a raw, untyped byte copy used only to load a `.bc` file into memory at startup. The two
/// paths intentionally disagree on endianness: bytecode is assembled little-endian, but once
/// loaded, typed access treats memory as big-endian.
///
/// [`blit`]: Memory::blit
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Constructs a zero-filled buffer of `capacity` bytes.
    ///
    /// ```
    /// use vcpu::memory::Memory;
    ///
    /// let memory = Memory::new(16);
    /// assert_eq!(memory.capacity(), 16);
    /// ```
    pub fn new(capacity: usize) -> Memory {
        Memory {
            data: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    fn check_range(&self, address: u64, length: u64) -> Result<(), Fault> {
        let capacity = self.capacity();
        if address.checked_add(length).map_or(true, |end| end > capacity) {
            return Err(Fault::OutOfBounds {
                address,
                size: length as u8,
                capacity,
            });
        }
        Ok(())
    }

    /// Loads `size` big-endian bytes starting at `address` into a `u64`.
    ///
    /// ```
    /// use vcpu::memory::Memory;
    ///
    /// let mut memory = Memory::new(4);
    /// memory.blit(0, &[0xDE, 0xAD]);
    /// assert_eq!(memory.read(0, 2).unwrap(), 0xDEAD);
    /// ```
    pub fn read(&self, address: u64, size: u8) -> Result<u64, Fault> {
        self.check_range(address, u64::from(size))?;
        let start = address as usize;
        let end = start + size as usize;
        Ok(MemoryEndian::read_uint(&self.data[start..end], size as usize))
    }

    /// Stores the low `size` bytes of `value`, big-endian, starting at `address`.
    ///
    /// ```
    /// use vcpu::memory::Memory;
    ///
    /// let mut memory = Memory::new(4);
    /// memory.write(0, 0xCAFE, 2).unwrap();
    /// assert_eq!(memory.blob(), &[0xCA, 0xFE, 0, 0]);
    /// ```
    pub fn write(&mut self, address: u64, value: u64, size: u8) -> Result<(), Fault> {
        self.check_range(address, u64::from(size))?;
        let start = address as usize;
        let end = start + size as usize;
        MemoryEndian::write_uint(&mut self.data[start..end], value, size as usize);
        Ok(())
    }

    /// Raw, untyped byte copy. Used to load an assembled `.bc` file into memory at address 0.
    pub fn blit(&mut self, address: u64, bytes: &[u8]) -> Result<(), Fault> {
        self.check_range(address, bytes.len() as u64)?;
        let start = address as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Reads `size` bytes of the instruction stream itself, decoded with [`AssemblerEndian`].
    ///
    /// This is distinct from [`read`](Memory::read): opcode operands (immediates, addresses,
    /// jump targets) are written little-endian by the assembler, while typed data loads and
    /// stores against computed addresses are big-endian. See the module docs.
    pub fn read_operand(&self, address: u64, size: u8) -> Result<u64, Fault> {
        self.check_range(address, u64::from(size))?;
        let start = address as usize;
        let end = start + size as usize;
        Ok(AssemblerEndian::read_uint(&self.data[start..end], size as usize))
    }

    /// Reads a NUL-terminated byte run starting at `address`, not including the terminator.
    pub fn read_c_string(&self, address: u64) -> Result<&[u8], Fault> {
        self.check_range(address, 0)?;
        let start = address as usize;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .map(|i| start + i)
            .ok_or(Fault::OutOfBounds {
                address,
                size: 0,
                capacity: self.capacity(),
            })?;
        Ok(&self.data[start..end])
    }

    pub fn blob(&self) -> &[u8] {
        &self.data[..]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_big_endian() {
        let mut memory = Memory::new(16);
        memory.write(4, 0xCAFEBABE, 8).unwrap();
        assert_eq!(memory.read(4, 8).unwrap(), 0xCAFEBABE);
    }

    #[test]
    fn out_of_bounds_read_is_fatal() {
        let memory = Memory::new(4);
        assert!(memory.read(2, 4).is_err());
    }

    #[test]
    fn blit_is_raw() {
        let mut memory = Memory::new(4);
        memory.blit(0, &[1, 2, 3, 4]).unwrap();
        assert_eq!(memory.blob(), &[1, 2, 3, 4]);
    }

    #[test]
    fn operand_fetch_is_little_endian_unlike_typed_access() {
        let mut memory = Memory::new(8);
        memory.blit(0, &[7, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(memory.read_operand(0, 8).unwrap(), 7);
        assert_ne!(memory.read(0, 8).unwrap(), 7);
    }

    #[test]
    fn c_string_stops_at_nul() {
        let mut memory = Memory::new(8);
        memory.blit(0, b"hi\0xx").unwrap();
        assert_eq!(memory.read_c_string(0).unwrap(), b"hi");
    }

    #[test]
    fn c_string_out_of_bounds_start_is_fatal_not_a_panic() {
        let memory = Memory::new(8);
        assert!(memory.read_c_string(8).is_err());
    }
}
