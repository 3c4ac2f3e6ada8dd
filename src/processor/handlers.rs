//! Per-opcode instruction handlers, grouped by family. Every handler's operand-fetch order
//! and write-back target follows the addressing-mode catalog's handler table, with two
//! deliberate corrections documented inline (`compare_reg_reg`, `inc_dec_addr`).

use std::io::{self, BufRead, Write};

use crate::error::{Fault, Interrupt};
use crate::opcode::Opcode;
use crate::register::RegisterId;

use super::Processor;

/// Dispatches one already-fetched opcode. Returns `Ok(false)` when the instruction was `EXIT`
/// and the dispatch loop should stop; `Ok(true)` otherwise.
pub fn dispatch(p: &mut Processor, opcode: Opcode) -> Result<bool, Fault> {
    use Opcode::*;

    match opcode {
        Add => arithmetic::add(p)?,
        Sub => arithmetic::sub(p)?,
        Mul => arithmetic::mul(p)?,
        Div => arithmetic::div(p)?,
        Mod => arithmetic::rem(p)?,

        IncReg => inc_dec::inc_reg(p)?,
        IncAddrInReg => inc_dec::inc_addr_in_reg(p)?,
        IncAddrLiteral => inc_dec::inc_addr_literal(p)?,
        DecReg => inc_dec::dec_reg(p)?,
        DecAddrInReg => inc_dec::dec_addr_in_reg(p)?,
        DecAddrLiteral => inc_dec::dec_addr_literal(p)?,

        NoOperation => {}

        MoveRegReg => mov::reg_reg(p)?,
        MoveRegAddrInReg => mov::reg_addr_in_reg(p)?,
        MoveRegConst => mov::reg_const(p)?,
        MoveRegAddrLiteral => mov::reg_addr_literal(p)?,
        MoveAddrInRegReg => mov::addr_in_reg_reg(p)?,
        MoveAddrInRegAddrInReg => mov::addr_in_reg_addr_in_reg(p)?,
        MoveAddrInRegConst => mov::addr_in_reg_const(p)?,
        MoveAddrInRegAddrLiteral => mov::addr_in_reg_addr_literal(p)?,
        MoveAddrLiteralReg => mov::addr_literal_reg(p)?,
        MoveAddrLiteralAddrInReg => mov::addr_literal_addr_in_reg(p)?,
        MoveAddrLiteralConst => mov::addr_literal_const(p)?,
        MoveAddrLiteralAddrLiteral => mov::addr_literal_addr_literal(p)?,

        PushReg => stack::push_reg(p)?,
        PushAddrInReg => stack::push_addr_in_reg(p)?,
        PushConst => stack::push_const(p)?,
        PushAddrLiteral => stack::push_addr_literal(p)?,
        PopReg => stack::pop_reg(p)?,
        PopAddrInReg => stack::pop_addr_in_reg(p)?,
        PopAddrLiteral => stack::pop_addr_literal(p)?,

        Label => return Err(Fault::InvalidOpcode(opcode as u8)),

        Jump => jump::jump(p)?,
        JumpIfTrueReg => jump::jump_if_true_reg(p)?,
        JumpIfFalseReg => jump::jump_if_false_reg(p)?,

        CompareRegReg => compare::reg_reg(p)?,
        CompareRegConst => compare::reg_const(p)?,
        CompareConstReg => compare::const_reg(p)?,
        CompareConstConst => compare::const_const(p)?,

        Print => interrupt::print(p),
        PrintString => interrupt::print_string(p)?,
        InputInt => interrupt::input_int(p),
        InputString => interrupt::input_string(p)?,

        Exit => return Ok(false),
    }

    Ok(true)
}

/// Floored division: the remainder takes the divisor's sign, unlike Rust's truncating `/`/`%`.
fn floor_div_mod(a: i64, b: i64) -> (i64, i64) {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        (q - 1, r + b)
    } else {
        (q, r)
    }
}

mod arithmetic {
    use super::*;

    pub fn add(p: &mut Processor) -> Result<(), Fault> {
        p.registers[RegisterId::A] = p.registers[RegisterId::A].wrapping_add(p.registers[RegisterId::B]);
        p.registers.set_arithmetic_flags(p.registers[RegisterId::A]);
        Ok(())
    }

    pub fn sub(p: &mut Processor) -> Result<(), Fault> {
        p.registers[RegisterId::A] = p.registers[RegisterId::A].wrapping_sub(p.registers[RegisterId::B]);
        p.registers.set_arithmetic_flags(p.registers[RegisterId::A]);
        Ok(())
    }

    pub fn mul(p: &mut Processor) -> Result<(), Fault> {
        p.registers[RegisterId::A] = p.registers[RegisterId::A].wrapping_mul(p.registers[RegisterId::B]);
        p.registers.set_arithmetic_flags(p.registers[RegisterId::A]);
        Ok(())
    }

    pub fn div(p: &mut Processor) -> Result<(), Fault> {
        let a = p.registers[RegisterId::A];
        let b = p.registers[RegisterId::B];
        if b == 0 {
            return Err(Fault::DivisionByZero);
        }
        let (quotient, remainder) = super::floor_div_mod(a, b);
        p.registers[RegisterId::A] = quotient;
        p.registers.set_arithmetic_flags(quotient);
        p.registers[RegisterId::RemainderFlag] = remainder;
        Ok(())
    }

    pub fn rem(p: &mut Processor) -> Result<(), Fault> {
        let a = p.registers[RegisterId::A];
        let b = p.registers[RegisterId::B];
        if b == 0 {
            return Err(Fault::DivisionByZero);
        }
        let (_, remainder) = super::floor_div_mod(a, b);
        p.registers[RegisterId::A] = remainder;
        p.registers.set_arithmetic_flags(remainder);
        Ok(())
    }
}

mod inc_dec {
    use super::*;

    pub fn inc_reg(p: &mut Processor) -> Result<(), Fault> {
        let id = p.fetch_register()?;
        p.registers[id] = p.registers[id].wrapping_add(1);
        p.registers.set_arithmetic_flags(p.registers[id]);
        Ok(())
    }

    pub fn dec_reg(p: &mut Processor) -> Result<(), Fault> {
        let id = p.fetch_register()?;
        p.registers[id] = p.registers[id].wrapping_sub(1);
        p.registers.set_arithmetic_flags(p.registers[id]);
        Ok(())
    }

    // Both address variants below write the updated value back to the *computed memory
    // address*, not to the register holding it — the only sensible target, since the register
    // only ever holds the address and never the value stored there.

    pub fn inc_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let id = p.fetch_register()?;
        let address = p.registers[id] as u64;
        let value = p.memory.read(address, size)?.wrapping_add(1);
        p.memory.write(address, value, size)?;
        p.registers.set_arithmetic_flags(value as i64);
        Ok(())
    }

    pub fn dec_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let id = p.fetch_register()?;
        let address = p.registers[id] as u64;
        let value = p.memory.read(address, size)?.wrapping_sub(1);
        p.memory.write(address, value, size)?;
        p.registers.set_arithmetic_flags(value as i64);
        Ok(())
    }

    pub fn inc_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let address = p.fetch_address_literal()?;
        let value = p.memory.read(address, size)?.wrapping_add(1);
        p.memory.write(address, value, size)?;
        p.registers.set_arithmetic_flags(value as i64);
        Ok(())
    }

    pub fn dec_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let address = p.fetch_address_literal()?;
        let value = p.memory.read(address, size)?.wrapping_sub(1);
        p.memory.write(address, value, size)?;
        p.registers.set_arithmetic_flags(value as i64);
        Ok(())
    }
}

mod mov {
    use super::*;

    pub fn reg_reg(p: &mut Processor) -> Result<(), Fault> {
        let dst = p.fetch_register()?;
        let src = p.fetch_register()?;
        p.registers[dst] = p.registers[src];
        Ok(())
    }

    pub fn reg_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst = p.fetch_register()?;
        let src = p.fetch_register()?;
        let address = p.registers[src] as u64;
        p.registers[dst] = p.memory.read(address, size)? as i64;
        Ok(())
    }

    pub fn reg_const(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst = p.fetch_register()?;
        p.registers[dst] = p.fetch_operand(size)? as i64;
        Ok(())
    }

    pub fn reg_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst = p.fetch_register()?;
        let address = p.fetch_address_literal()?;
        p.registers[dst] = p.memory.read(address, size)? as i64;
        Ok(())
    }

    pub fn addr_in_reg_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst_reg = p.fetch_register()?;
        let address = p.registers[dst_reg] as u64;
        let src = p.fetch_register()?;
        p.memory.write(address, p.registers[src] as u64, size)?;
        Ok(())
    }

    pub fn addr_in_reg_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst_reg = p.fetch_register()?;
        let dst_address = p.registers[dst_reg] as u64;
        let src_reg = p.fetch_register()?;
        let src_address = p.registers[src_reg] as u64;
        let value = p.memory.read(src_address, size)?;
        p.memory.write(dst_address, value, size)?;
        Ok(())
    }

    pub fn addr_in_reg_const(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst_reg = p.fetch_register()?;
        let address = p.registers[dst_reg] as u64;
        let value = p.fetch_operand(size)?;
        p.memory.write(address, value, size)?;
        Ok(())
    }

    pub fn addr_in_reg_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst_reg = p.fetch_register()?;
        let dst_address = p.registers[dst_reg] as u64;
        let src_address = p.fetch_address_literal()?;
        let value = p.memory.read(src_address, size)?;
        p.memory.write(dst_address, value, size)?;
        Ok(())
    }

    pub fn addr_literal_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let address = p.fetch_address_literal()?;
        let src = p.fetch_register()?;
        p.memory.write(address, p.registers[src] as u64, size)?;
        Ok(())
    }

    pub fn addr_literal_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst_address = p.fetch_address_literal()?;
        let src_reg = p.fetch_register()?;
        let src_address = p.registers[src_reg] as u64;
        let value = p.memory.read(src_address, size)?;
        p.memory.write(dst_address, value, size)?;
        Ok(())
    }

    pub fn addr_literal_const(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let address = p.fetch_address_literal()?;
        let value = p.fetch_operand(size)?;
        p.memory.write(address, value, size)?;
        Ok(())
    }

    pub fn addr_literal_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let dst_address = p.fetch_address_literal()?;
        let src_address = p.fetch_address_literal()?;
        let value = p.memory.read(src_address, size)?;
        p.memory.write(dst_address, value, size)?;
        Ok(())
    }
}

mod stack {
    use super::*;

    fn push(p: &mut Processor, value: u64, size: u8) -> Result<(), Fault> {
        let sp = p.registers[RegisterId::StackPointer] as u64;
        p.memory.write(sp, value, size)?;
        p.registers[RegisterId::StackPointer] += i64::from(size);
        Ok(())
    }

    fn pop(p: &mut Processor, size: u8) -> Result<u64, Fault> {
        p.registers[RegisterId::StackPointer] -= i64::from(size);
        let sp = p.registers[RegisterId::StackPointer] as u64;
        p.memory.read(sp, size)
    }

    pub fn push_reg(p: &mut Processor) -> Result<(), Fault> {
        let id = p.fetch_register()?;
        push(p, p.registers[id] as u64, 8)
    }

    pub fn push_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let id = p.fetch_register()?;
        let address = p.registers[id] as u64;
        let value = p.memory.read(address, size)?;
        push(p, value, size)
    }

    pub fn push_const(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let value = p.fetch_operand(size)?;
        push(p, value, size)
    }

    pub fn push_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let address = p.fetch_address_literal()?;
        let value = p.memory.read(address, size)?;
        push(p, value, size)
    }

    pub fn pop_reg(p: &mut Processor) -> Result<(), Fault> {
        let id = p.fetch_register()?;
        let value = pop(p, 8)?;
        p.registers[id] = value as i64;
        Ok(())
    }

    pub fn pop_addr_in_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let id = p.fetch_register()?;
        let address = p.registers[id] as u64;
        let value = pop(p, size)?;
        p.memory.write(address, value, size)
    }

    pub fn pop_addr_literal(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let address = p.fetch_address_literal()?;
        let value = pop(p, size)?;
        p.memory.write(address, value, size)
    }
}

mod jump {
    use super::*;

    pub fn jump(p: &mut Processor) -> Result<(), Fault> {
        let target = p.fetch_address_literal()?;
        p.registers[RegisterId::ProgramCounter] = target as i64;
        Ok(())
    }

    pub fn jump_if_true_reg(p: &mut Processor) -> Result<(), Fault> {
        let target = p.fetch_address_literal()?;
        let id = p.fetch_register()?;
        if p.registers[id] != 0 {
            p.registers[RegisterId::ProgramCounter] = target as i64;
        }
        Ok(())
    }

    pub fn jump_if_false_reg(p: &mut Processor) -> Result<(), Fault> {
        let target = p.fetch_address_literal()?;
        let id = p.fetch_register()?;
        if p.registers[id] == 0 {
            p.registers[RegisterId::ProgramCounter] = target as i64;
        }
        Ok(())
    }
}

mod compare {
    use super::*;

    // `reg_reg` compares the two registers' *values* — the operand bytes are register indexes,
    // not the quantities to compare, so both must be read out of the register file first.
    pub fn reg_reg(p: &mut Processor) -> Result<(), Fault> {
        let lhs = p.fetch_register()?;
        let rhs = p.fetch_register()?;
        p.registers.set_arithmetic_flags(p.registers[lhs].wrapping_sub(p.registers[rhs]));
        Ok(())
    }

    pub fn reg_const(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let id = p.fetch_register()?;
        let value = p.fetch_operand(size)?;
        p.registers.set_arithmetic_flags(p.registers[id].wrapping_sub(value as i64));
        Ok(())
    }

    pub fn const_reg(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let value = p.fetch_operand(size)?;
        let id = p.fetch_register()?;
        p.registers.set_arithmetic_flags((value as i64).wrapping_sub(p.registers[id]));
        Ok(())
    }

    pub fn const_const(p: &mut Processor) -> Result<(), Fault> {
        let size = p.fetch_handled_size()?;
        let lhs = p.fetch_operand(size)?;
        let rhs = p.fetch_operand(size)?;
        p.registers.set_arithmetic_flags((lhs as i64).wrapping_sub(rhs as i64));
        Ok(())
    }
}

mod interrupt {
    use super::*;

    pub fn print(p: &mut Processor) {
        print!("{}", p.registers[RegisterId::Print]);
        let _ = io::stdout().flush();
    }

    pub fn print_string(p: &mut Processor) -> Result<(), Fault> {
        let address = p.registers[RegisterId::Print] as u64;
        let bytes = p.memory.read_c_string(address)?;
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                print!("{}", text);
                let _ = io::stdout().flush();
            }
            Err(_) => p.registers[RegisterId::Error] = Interrupt::InvalidInput.code(),
        }
        Ok(())
    }

    pub fn input_int(p: &mut Processor) {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => p.registers[RegisterId::Error] = Interrupt::EndOfFile.code(),
            Ok(_) => match line.trim().parse::<i64>() {
                Ok(value) => p.registers[RegisterId::Input] = value,
                Err(_) => p.registers[RegisterId::Error] = Interrupt::InvalidInput.code(),
            },
            Err(_) => p.registers[RegisterId::Error] = Interrupt::GenericError.code(),
        }
    }

    pub fn input_string(p: &mut Processor) -> Result<(), Fault> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => {
                p.registers[RegisterId::Error] = Interrupt::EndOfFile.code();
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => {
                // `read_line` surfaces non-UTF-8 stdin bytes as `InvalidData`; everything else
                // (a closed pipe, an interrupted read, ...) is a generic I/O failure.
                p.registers[RegisterId::Error] = if err.kind() == io::ErrorKind::InvalidData {
                    Interrupt::InvalidInput.code()
                } else {
                    Interrupt::GenericError.code()
                };
                return Ok(());
            }
        }
        let text = line.strip_suffix('\n').unwrap_or(&line);
        let text = text.strip_suffix('\r').unwrap_or(text);
        let bytes = text.as_bytes();

        let sp = p.registers[RegisterId::StackPointer] as u64;
        p.memory.blit(sp, bytes)?;
        p.registers[RegisterId::StackPointer] += bytes.len() as i64;
        p.registers[RegisterId::Input] = bytes.len() as i64;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::DEFAULT_MEMORY_SIZE;

    fn processor() -> Processor {
        Processor::new(DEFAULT_MEMORY_SIZE)
    }

    #[test]
    fn add_sets_registers_and_flags() {
        let mut p = processor();
        p.registers[RegisterId::A] = 40;
        p.registers[RegisterId::B] = 2;
        dispatch(&mut p, Opcode::Add).unwrap();
        assert_eq!(p.registers[RegisterId::A], 42);
        assert!(!p.registers.flag(RegisterId::ZeroFlag));
    }

    #[test]
    fn div_by_zero_is_fatal() {
        let mut p = processor();
        p.registers[RegisterId::A] = 10;
        p.registers[RegisterId::B] = 0;
        assert_eq!(dispatch(&mut p, Opcode::Div), Err(Fault::DivisionByZero));
    }

    #[test]
    fn div_rounds_toward_negative_infinity() {
        let mut p = processor();
        p.registers[RegisterId::A] = -7;
        p.registers[RegisterId::B] = 2;
        dispatch(&mut p, Opcode::Div).unwrap();
        assert_eq!(p.registers[RegisterId::A], -4);
        assert_eq!(p.registers[RegisterId::RemainderFlag], 1);
    }

    #[test]
    fn compare_reg_reg_compares_values_not_indexes() {
        // Dispatch assumes the program counter already sits at the first operand byte, so the
        // "program" here is just the operand bytes: [register A, register B].
        let mut p = processor();
        p.registers[RegisterId::A] = 5;
        p.registers[RegisterId::B] = 5;
        p.load(&[RegisterId::A as u8, RegisterId::B as u8]).unwrap();
        dispatch(&mut p, Opcode::CompareRegReg).unwrap();
        assert!(p.registers.flag(RegisterId::ZeroFlag));
    }

    #[test]
    fn compare_reg_reg_wraps_instead_of_panicking_on_overflow() {
        // i64::MIN - 1 overflows a plain `-`; the wrapped result is i64::MAX, which is neither
        // zero nor negative.
        let mut p = processor();
        p.registers[RegisterId::A] = i64::MIN;
        p.registers[RegisterId::B] = 1;
        p.load(&[RegisterId::A as u8, RegisterId::B as u8]).unwrap();
        dispatch(&mut p, Opcode::CompareRegReg).unwrap();
        assert!(!p.registers.flag(RegisterId::ZeroFlag));
        assert!(!p.registers.flag(RegisterId::SignFlag));
    }

    #[test]
    fn inc_addr_in_reg_writes_back_to_memory_not_a_register() {
        // Operand layout: [handled_size, register]. Register A holds the target address (10);
        // memory there starts at 9 and should become 10, while register A itself is untouched.
        let mut p = processor();
        p.registers[RegisterId::A] = 10;
        p.load(&[1u8, RegisterId::A as u8]).unwrap();
        p.memory.write(10, 9, 1).unwrap();
        dispatch(&mut p, Opcode::IncAddrInReg).unwrap();
        assert_eq!(p.registers[RegisterId::A], 10);
        assert_eq!(p.memory.read(10, 1).unwrap(), 10);
    }
}
