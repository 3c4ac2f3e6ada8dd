//! End-to-end execution tests. These hand-encode the bytecode a real assembler would produce
//! rather than going through one: `vcpu` sits below `vasm` in the dependency graph, so its own
//! tests can't assemble text. The equivalent assembly source for each scenario is noted above
//! the test that encodes it.

use crate::constants::DEFAULT_MEMORY_SIZE;
use crate::opcode::Opcode;
use crate::register::RegisterId;
use crate::Processor;

/// Small bytecode builder: appends opcodes/operands in the encoding a real assembler would
/// produce (handled_size and register indexes as single bytes, numbers/addresses little-endian).
#[derive(Default)]
struct Program(Vec<u8>);

impl Program {
    fn op(mut self, opcode: Opcode) -> Self {
        self.0.push(opcode as u8);
        self
    }

    fn sized(mut self, opcode: Opcode, size: u8) -> Self {
        self.0.push(opcode as u8);
        self.0.push(size);
        self
    }

    fn reg(mut self, id: RegisterId) -> Self {
        self.0.push(id as u8);
        self
    }

    fn num8(mut self, value: u64) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn addr(self, address: u64) -> Self {
        self.num8(address)
    }

    fn bytes(self) -> Vec<u8> {
        self.0
    }
}

fn run(bytecode: Vec<u8>) -> Processor {
    let mut processor = Processor::new(DEFAULT_MEMORY_SIZE);
    processor.load(&bytecode).unwrap();
    let status = processor.run().unwrap();
    assert_eq!(processor.registers()[RegisterId::Exit], status);
    processor
}

#[test]
fn addition_and_exit() {
    // mov8 a 7; mov8 b 35; add; mov8 exit a; exit
    let bytecode = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(7)
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::B)
        .num8(35)
        .op(Opcode::Add)
        .op(Opcode::MoveRegReg)
        .reg(RegisterId::Exit)
        .reg(RegisterId::A)
        .op(Opcode::Exit)
        .bytes();

    let processor = run(bytecode);
    assert_eq!(processor.registers()[RegisterId::Exit], 42);
    assert!(!processor.registers().flag(RegisterId::ZeroFlag));
    assert!(!processor.registers().flag(RegisterId::SignFlag));
}

#[test]
fn division_by_zero_is_fatal() {
    // mov8 a 10; mov8 b 0; div; exit
    let bytecode = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(10)
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::B)
        .num8(0)
        .op(Opcode::Div)
        .op(Opcode::Exit)
        .bytes();

    let mut processor = Processor::new(DEFAULT_MEMORY_SIZE);
    processor.load(&bytecode).unwrap();
    let error = processor.run().unwrap_err();
    assert_eq!(error, crate::error::Fault::DivisionByZero);
}

#[test]
fn unconditional_loop_with_conditional_exit() {
    // mov8 a 3
    // @top: dec a
    //       cjmp top, a
    // mov8 exit a
    // exit
    let prelude = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(3)
        .bytes();
    let top = prelude.len() as u64;

    let mut bytecode = prelude;
    bytecode.extend(
        Program::default()
            .op(Opcode::DecReg)
            .reg(RegisterId::A)
            .op(Opcode::JumpIfTrueReg)
            .addr(top)
            .reg(RegisterId::A)
            .op(Opcode::MoveRegReg)
            .reg(RegisterId::Exit)
            .reg(RegisterId::A)
            .op(Opcode::Exit)
            .bytes(),
    );

    let processor = run(bytecode);
    assert_eq!(processor.registers()[RegisterId::Exit], 0);
    assert!(processor.registers().flag(RegisterId::ZeroFlag));
}

#[test]
fn memory_round_trip() {
    // mov8 [100] 0xCAFEBABE; mov8 a [100]; mov8 exit a; exit
    let bytecode = Program::default()
        .sized(Opcode::MoveAddrLiteralConst, 8)
        .addr(100)
        .num8(0xCAFEBABE)
        .sized(Opcode::MoveRegAddrLiteral, 8)
        .reg(RegisterId::A)
        .addr(100)
        .op(Opcode::MoveRegReg)
        .reg(RegisterId::Exit)
        .reg(RegisterId::A)
        .op(Opcode::Exit)
        .bytes();

    let processor = run(bytecode);
    assert_eq!(processor.registers()[RegisterId::Exit], 0xCAFEBABE);
}

#[test]
fn stack_push_pop_identity() {
    // mov8 a 99; push a; mov8 a 0; pop a; mov8 exit a; exit
    let bytecode = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(99)
        .op(Opcode::PushReg)
        .reg(RegisterId::A)
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(0)
        .op(Opcode::PopReg)
        .reg(RegisterId::A)
        .op(Opcode::MoveRegReg)
        .reg(RegisterId::Exit)
        .reg(RegisterId::A)
        .op(Opcode::Exit)
        .bytes();

    let program_length = bytecode.len() as i64;
    let processor = run(bytecode);
    assert_eq!(processor.registers()[RegisterId::Exit], 99);
    assert_eq!(processor.registers()[RegisterId::StackPointer], program_length);
}

#[test]
fn compare_sets_zero_flag() {
    // mov8 a 5; mov8 b 5; cmp a, b; njmp done, zf; mov8 exit 1; @done: mov8 exit 0; exit
    let head = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(5)
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::B)
        .num8(5)
        .op(Opcode::CompareRegReg)
        .reg(RegisterId::A)
        .reg(RegisterId::B)
        .bytes();
    let njmp_len = 1 + 8 + 1; // opcode + address + register
    let exit_one = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::Exit)
        .num8(1)
        .bytes();
    let done = (head.len() + njmp_len + exit_one.len()) as u64;

    let mut bytecode = head;
    bytecode.extend(
        Program::default()
            .op(Opcode::JumpIfFalseReg)
            .addr(done)
            .reg(RegisterId::ZeroFlag)
            .bytes(),
    );
    bytecode.extend(exit_one);
    bytecode.extend(
        Program::default()
            .sized(Opcode::MoveRegConst, 8)
            .reg(RegisterId::Exit)
            .num8(0)
            .op(Opcode::Exit)
            .bytes(),
    );

    let processor = run(bytecode);
    assert_eq!(processor.registers()[RegisterId::Exit], 0);
    assert!(processor.registers().flag(RegisterId::ZeroFlag));
}

#[test]
fn error_register_clears_before_every_dispatch() {
    // prt_string on invalid UTF-8 sets ERROR without touching stdin, so this stays
    // deterministic. The following instruction must see ERROR cleared again, per the
    // "ERROR clears" invariant.
    let bytecode = Program::default()
        .op(Opcode::PrintString)
        .op(Opcode::NoOperation)
        .op(Opcode::Exit)
        .bytes();

    let mut processor = Processor::new(DEFAULT_MEMORY_SIZE);
    processor.load(&bytecode).unwrap();
    processor.registers_mut()[RegisterId::Print] = bytecode.len() as i64;
    // Invalid UTF-8 continuation byte, NUL-terminated, placed just past the loaded program.
    processor.memory_mut().blit(bytecode.len() as u64, &[0x80, 0]).unwrap();

    processor.run().unwrap();
    assert_eq!(processor.registers()[RegisterId::Error], 0);
}

#[test]
fn pc_advances_by_the_encoded_instruction_length_between_non_jumps() {
    let bytecode = Program::default()
        .sized(Opcode::MoveRegConst, 8)
        .reg(RegisterId::A)
        .num8(1)
        .op(Opcode::Exit)
        .bytes();

    let mut processor = Processor::new(DEFAULT_MEMORY_SIZE);
    processor.load(&bytecode).unwrap();
    processor
        .run_with_trace(|pc, _| assert!(pc == 0 || pc == 11))
        .unwrap();
}
