//! Reads and writes `.bc` files: a raw bytecode stream with no header, no length prefix, and
//! no framing of any kind. This ISA has no separate data section, so the format is a single
//! byte stream and the extension traits are named to say so.

use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads the remainder of `reader` as a bytecode stream.
pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut bytecode = Vec::new();
    reader.read_to_end(&mut bytecode)?;
    Ok(bytecode)
}

/// Writes `bytecode` verbatim, with no header or framing.
pub fn write<W: Write>(writer: &mut W, bytecode: &[u8]) -> std::io::Result<()> {
    writer.write_all(bytecode)
}

pub trait ReadBytecodeExt: Read + Sized {
    fn read_bytecode(&mut self) -> std::io::Result<Vec<u8>> {
        read(self)
    }
}

impl<R: Read + Sized> ReadBytecodeExt for R {}

pub trait WriteBytecodeExt: Write + Sized {
    fn write_bytecode(&mut self, bytecode: &[u8]) -> std::io::Result<()> {
        write(self, bytecode)
    }
}

impl<W: Write + Sized> WriteBytecodeExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<u8>> {
    BufReader::new(File::open(path)?).read_bytecode()
}

pub fn write_file<P: AsRef<Path>>(path: P, bytecode: &[u8]) -> std::io::Result<()> {
    BufWriter::new(File::create(path)?).write_bytecode(bytecode)
}

#[cfg(test)]
mod test;
