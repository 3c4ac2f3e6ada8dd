//! Thin library surface behind the `vm` and `disasm` binaries: load a `.bc` file and run it, or
//! load one and disassemble it.

pub mod error;

pub use error::Error;

use vcpu::Processor;

/// Loads `bytecode` into a freshly sized [`Processor`] and runs it to completion, logging one
/// `trace`-level line per dispatched instruction.
pub fn run_bytecode(bytecode: &[u8], memory_size: usize) -> Result<(Processor, i64), Error> {
    let mut processor = Processor::new(memory_size);
    processor.load(bytecode)?;
    let status = processor.run_with_trace(|pc, opcode| {
        log::trace!("{:#06x}: {:?}", pc, opcode);
    })?;
    Ok((processor, status))
}

/// Reads a `.bc` file and runs it. See [`run_bytecode`].
pub fn run_file<P: AsRef<std::path::Path>>(
    path: P,
    memory_size: usize,
) -> Result<(Processor, i64), Error> {
    let bytecode = vexfile::read_file(path)?;
    run_bytecode(&bytecode, memory_size)
}

/// Reads a `.bc` file and renders it as annotated assembly text.
pub fn disassemble_file<P: AsRef<std::path::Path>>(path: P) -> Result<String, Error> {
    let bytecode = vexfile::read_file(path)?;
    let instructions = vcpu::disassemble::disassemble(&bytecode)?;
    Ok(vcpu::disassemble::render(&instructions))
}

#[cfg(test)]
mod test;
