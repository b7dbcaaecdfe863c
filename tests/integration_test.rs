use qpuasm::assembler::encoder::placement::ReadOperand;
use qpuasm::immediates::Immediate;
use qpuasm::opcodes::{AddOp, BranchCond, MulOp, Signal};
use qpuasm::registers::{regfile_a, regfile_b, R0, R1};
use qpuasm::{Assembler, AssemblerError, BranchTarget};

#[test]
fn a_minimal_program_assembles_to_one_word_per_emit() {
    let mut asm = Assembler::new();
    asm.ldi_single(regfile_a(0), &Immediate::Int(42)).unwrap();
    asm.emit_add(
        AddOp::Iadd,
        regfile_a(1),
        ReadOperand::Reg(regfile_a(0)),
        ReadOperand::Reg(R0),
        Signal::NoSignal,
        true,
    )
    .unwrap();
    asm.exit().unwrap();

    let bytes = asm.finalize().unwrap();
    assert_eq!(bytes.len() % 8, 0);
    assert_eq!(bytes.len(), 8 * (1 + 1 + 4));
}

#[test]
fn add_then_mul_fluent_binding_rewrites_the_same_word() {
    let mut asm = Assembler::new();
    let binder = asm
        .emit_add(
            AddOp::Iadd,
            regfile_a(2),
            ReadOperand::Reg(R0),
            ReadOperand::Reg(R1),
            Signal::NoSignal,
            true,
        )
        .unwrap();
    let pc_after_add = binder.pc();
    binder
        .emit(
            MulOp::Fmul,
            regfile_b(3),
            ReadOperand::Reg(R0),
            ReadOperand::Reg(R1),
            None,
        )
        .unwrap();
    assert_eq!(asm.pc(), pc_after_add, "mul binding must not advance the pc");

    let bytes = asm.finalize().unwrap();
    assert_eq!(bytes.len(), 8);
    let word = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
    let op_mul = (word >> 29) & 0b111;
    assert_eq!(op_mul, MulOp::Fmul.code() as u64);
}

#[test]
fn backward_branch_resolves_without_a_pending_entry() {
    let mut asm = Assembler::new();
    asm.label("top").unwrap();
    asm.emit_add(
        AddOp::Nop,
        qpuasm::registers::NULL,
        ReadOperand::default(),
        ReadOperand::default(),
        Signal::NoSignal,
        false,
    )
    .unwrap();
    asm.branch(BranchCond::Jmp, BranchTarget::Label("top".into()), None, None)
        .unwrap();
    let bytes = asm.finalize().unwrap();
    assert_eq!(bytes.len(), 16);
}

#[test]
fn conflicting_regfile_addresses_on_one_word_fail_with_a_precise_diagnostic() {
    let mut asm = Assembler::new();
    let err = asm
        .emit_add(
            AddOp::Iadd,
            qpuasm::registers::NULL,
            ReadOperand::Reg(regfile_a(1)),
            ReadOperand::Reg(regfile_a(2)),
            Signal::NoSignal,
            true,
        )
        .unwrap_err();
    assert!(matches!(err, AssemblerError::TooManyRegfileA));
}

#[test]
fn semaphore_round_trip_does_not_advance_beyond_one_word_each() {
    let mut asm = Assembler::new();
    asm.sema_up(1).unwrap();
    asm.sema_down(1).unwrap();
    assert_eq!(asm.pc(), 16);
}

#[test]
fn out_of_range_semaphore_id_fails() {
    let mut asm = Assembler::new();
    assert!(matches!(
        asm.sema_up(16),
        Err(AssemblerError::BadSemaphoreId(16))
    ));
}

#[test]
fn finalized_assembler_byte_length_matches_word_count() {
    let mut asm = Assembler::new();
    for _ in 0..5 {
        asm.emit_add(
            AddOp::Nop,
            qpuasm::registers::NULL,
            ReadOperand::default(),
            ReadOperand::default(),
            Signal::NoSignal,
            false,
        )
        .unwrap();
    }
    let bytes = asm.finalize().unwrap();
    assert_eq!(bytes.len(), 5 * 8);
}
