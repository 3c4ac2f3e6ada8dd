use super::*;

fn bytecode_for_exit_42() -> Vec<u8> {
    // mov8 a 42; mov8 exit a; exit, hand-encoded (vex depends on vasm, but exercising the
    // encoder isn't this crate's job — vasm owns those tests).
    let mut bytecode = Vec::new();
    bytecode.push(vcpu::Opcode::MoveRegConst as u8);
    bytecode.push(8);
    bytecode.push(vcpu::RegisterId::A as u8);
    bytecode.extend_from_slice(&42u64.to_le_bytes());
    bytecode.push(vcpu::Opcode::MoveRegReg as u8);
    bytecode.push(vcpu::RegisterId::Exit as u8);
    bytecode.push(vcpu::RegisterId::A as u8);
    bytecode.push(vcpu::Opcode::Exit as u8);
    bytecode
}

#[test]
fn run_bytecode_returns_the_exit_status() {
    let (_processor, status) = run_bytecode(&bytecode_for_exit_42(), 64).unwrap();
    assert_eq!(status, 42);
}

#[test]
fn run_file_reads_a_bc_file_and_executes_it() {
    let path = std::env::temp_dir().join("vex_run_file_test.bc");
    vexfile::write_file(&path, &bytecode_for_exit_42()).unwrap();

    let (_processor, status) = run_file(&path, 64).unwrap();
    assert_eq!(status, 42);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn disassemble_file_renders_annotated_assembly() {
    let path = std::env::temp_dir().join("vex_disassemble_file_test.bc");
    vexfile::write_file(&path, &bytecode_for_exit_42()).unwrap();

    let text = disassemble_file(&path).unwrap();
    assert!(text.contains("mov8 a, 42"));
    assert!(text.contains("exit"));

    std::fs::remove_file(&path).unwrap();
}
