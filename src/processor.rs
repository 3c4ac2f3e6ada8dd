//! Fetch-decode-dispatch execution engine.

mod handlers;

use num_traits::FromPrimitive;

use crate::constants::is_valid_size;
use crate::error::Fault;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::register::{RegisterId, Registers};

/// One running instance of the virtual machine: a register file plus the memory it was
/// loaded into. Owns both exclusively for its lifetime.
pub struct Processor {
    registers: Registers,
    memory: Memory,
}

impl Processor {
    /// Builds a processor around a freshly allocated, zeroed memory of `capacity` bytes.
    pub fn new(capacity: usize) -> Processor {
        Processor {
            registers: Registers::new(),
            memory: Memory::new(capacity),
        }
    }

    /// Blits `bytecode` into memory at address 0 and initializes `STACK_POINTER` to the end
    /// of the loaded program and `PROGRAM_COUNTER` to 0.
    pub fn load(&mut self, bytecode: &[u8]) -> Result<(), Fault> {
        self.memory.blit(0, bytecode)?;
        self.registers[RegisterId::StackPointer] = bytecode.len() as i64;
        self.registers[RegisterId::ProgramCounter] = 0;
        Ok(())
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Runs until `EXIT`, returning the process status (the `EXIT` register's final value).
    pub fn run(&mut self) -> Result<i64, Fault> {
        self.run_with_trace(|_, _| {})
    }

    /// Like [`run`](Processor::run), but invokes `trace` with the program counter and decoded
    /// opcode of every instruction immediately before it dispatches — the hook the `-v`
    /// verbose-tracing CLI flag is built on.
    pub fn run_with_trace<F>(&mut self, mut trace: F) -> Result<i64, Fault>
    where
        F: FnMut(u64, Opcode),
    {
        loop {
            let pc = self.pc();
            let opcode_byte = self.fetch_u8()?;
            let opcode =
                Opcode::from_u8(opcode_byte).ok_or(Fault::InvalidOpcode(opcode_byte))?;

            trace(pc, opcode);

            let keep_running = handlers::dispatch(self, opcode)?;

            // Volatile registers are cleared once per dispatch, unconditionally, regardless of
            // which opcode just ran.
            self.registers[RegisterId::Error] = 0;

            if !keep_running {
                break;
            }
        }

        Ok(self.registers[RegisterId::Exit])
    }

    fn pc(&self) -> u64 {
        self.registers[RegisterId::ProgramCounter] as u64
    }

    fn advance_pc(&mut self, amount: u64) {
        self.registers[RegisterId::ProgramCounter] += amount as i64;
    }

    /// Fetches one byte at the program counter and advances it by one.
    fn fetch_u8(&mut self) -> Result<u8, Fault> {
        let pc = self.pc();
        let value = self.memory.read_operand(pc, 1)? as u8;
        self.advance_pc(1);
        Ok(value)
    }

    /// Fetches `size` operand bytes (little-endian, per the assembler's on-disk encoding) and
    /// advances the program counter past them.
    fn fetch_operand(&mut self, size: u8) -> Result<u64, Fault> {
        let pc = self.pc();
        let value = self.memory.read_operand(pc, size)?;
        self.advance_pc(u64::from(size));
        Ok(value)
    }

    fn fetch_register(&mut self) -> Result<RegisterId, Fault> {
        let index = self.fetch_u8()?;
        RegisterId::from_u8(index).ok_or(Fault::InvalidRegister(index))
    }

    fn fetch_handled_size(&mut self) -> Result<u8, Fault> {
        let size = self.fetch_u8()?;
        if is_valid_size(size) {
            Ok(size)
        } else {
            Err(Fault::InvalidHandledSize(size))
        }
    }

    fn fetch_address_literal(&mut self) -> Result<u64, Fault> {
        self.fetch_operand(8)
    }
}
