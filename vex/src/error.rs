use thiserror::Error;

/// Top-level error for the `vex` binaries: a `.bc` file failed to read/write, or the loaded
/// bytecode faulted during execution or disassembly.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Fault(#[from] vcpu::Fault),
}
