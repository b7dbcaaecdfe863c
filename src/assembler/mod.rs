//! The assembler core: emits ALU, load-immediate, branch, and semaphore
//! words into an append-only buffer, tracks the program counter and
//! label map, and resolves forward branches at finalization.

pub mod encoder;
pub mod pseudo;

use std::collections::HashMap;

use self::encoder::instruction_encoders::{alu, branch as branch_word, load, semaphore};
use self::encoder::placement::{locate_read_operands, locate_write_operands, ReadOperand};
use crate::errors::AssemblerError;
use crate::immediates::Immediate;
use crate::opcodes::{AddOp, BranchCond, MulOp, Signal};
use crate::registers::{Register, NULL, R0};

/// A branch target: a forward-or-backward symbolic label, resolved at
/// `finalize`, or an already-known absolute displacement.
#[derive(Debug, Clone)]
pub enum BranchTarget {
    Label(String),
    Absolute(i32),
}

/// The mul-pipe's rotate modifier: either a rotate by the contents of r5,
/// or a fixed rotate amount in `1..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotate {
    R5,
    By(u8),
}

#[derive(Debug)]
pub struct Assembler {
    words: Vec<u64>,
    pc: u32,
    labels: HashMap<String, u32>,
    pending: Vec<(u32, String)>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            pc: 0,
            labels: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Emit an add-pipe instruction; the mul pipe is a placeholder `nop`
    /// until the returned binder is given a mul mnemonic, which rewrites
    /// this word in place.
    pub fn emit_add(
        &mut self,
        op: AddOp,
        dst: Register,
        a: ReadOperand,
        b: ReadOperand,
        sig: Signal,
        sf: bool,
    ) -> Result<MulBinder<'_>, AssemblerError> {
        let read = locate_read_operands([
            a.clone(),
            b.clone(),
            ReadOperand::Reg(R0),
            ReadOperand::Reg(R0),
        ])?;
        if read.immediate_flag && sig.code() != Signal::AluSmallImm.code() {
            return Err(AssemblerError::SignalConflictsWithImmediate);
        }
        let write = locate_write_operands(Some(&dst), None)?;
        let sf = if matches!(op, AddOp::Nop) { false } else { sf };

        let fields = alu::AluFields {
            op_add: op.code(),
            op_mul: MulOp::Nop.code(),
            read,
            write,
            sig: sig.code(),
            sf,
            cond_add: 1,
            cond_mul: 1,
        };
        let word = alu::encode(&fields)?;
        let index = self.words.len();
        self.words.push(word);
        self.pc += 8;

        Ok(MulBinder {
            asm: self,
            index,
            add_op: op,
            add_dst: dst,
            add_a: a,
            add_b: b,
            sig,
            sf,
        })
    }

    /// Load a 32-bit immediate into `dst_a`/`dst_b`. Pass `registers::NULL`
    /// for the unused side of a single-destination load.
    pub fn ldi(
        &mut self,
        dst_a: Register,
        dst_b: Register,
        value: &Immediate,
    ) -> Result<(), AssemblerError> {
        let (immediate, unpack) = crate::immediates::pack_imm(value)?;
        let word = load::encode(&load::LoadFields {
            immediate,
            unpack,
            dst_a,
            dst_b,
        })?;
        self.words.push(word);
        self.pc += 8;
        Ok(())
    }

    /// Shorthand for `ldi(dst, registers::NULL, value)`.
    pub fn ldi_single(&mut self, dst: Register, value: &Immediate) -> Result<(), AssemblerError> {
        self.ldi(dst, NULL, value)
    }

    pub fn branch(
        &mut self,
        cond: BranchCond,
        target: BranchTarget,
        reg: Option<Register>,
        link: Option<Register>,
    ) -> Result<(), AssemblerError> {
        let emit_pc = self.pc;
        let (immediate, rel) = match &target {
            BranchTarget::Label(_) => (0u32, true),
            BranchTarget::Absolute(disp) => (*disp as u32, false),
        };
        let word = branch_word::encode(&branch_word::BranchFields {
            cond,
            immediate,
            rel,
            reg,
            link,
        })?;
        self.words.push(word);
        if let BranchTarget::Label(name) = target {
            self.pending.push((emit_pc, name));
        }
        self.pc += 8;
        Ok(())
    }

    pub fn sema_up(&mut self, id: u8) -> Result<(), AssemblerError> {
        let word = semaphore::encode(id, true)?;
        self.words.push(word);
        self.pc += 8;
        Ok(())
    }

    pub fn sema_down(&mut self, id: u8) -> Result<(), AssemblerError> {
        let word = semaphore::encode(id, false)?;
        self.words.push(word);
        self.pc += 8;
        Ok(())
    }

    pub fn label(&mut self, name: &str) -> Result<(), AssemblerError> {
        if self.labels.contains_key(name) {
            return Err(AssemblerError::DuplicateLabel(name.to_string()));
        }
        self.labels.insert(name.to_string(), self.pc);
        Ok(())
    }

    /// Resolve every pending forward branch and return the concatenated,
    /// little-endian byte buffer. Consumes the assembler.
    pub fn finalize(mut self) -> Result<Vec<u8>, AssemblerError> {
        for (emit_pc, name) in self.pending.drain(..) {
            let target_pc = *self
                .labels
                .get(&name)
                .ok_or_else(|| AssemblerError::UndefinedLabel(name.clone()))?;
            let disp = target_pc as i64 - (emit_pc as i64 + 4 * 8);
            let index = (emit_pc / 8) as usize;
            let word = self.words[index];
            self.words[index] = (word & !0xFFFF_FFFFu64) | (disp as u32 as u64);
        }

        let mut bytes = Vec::with_capacity(self.words.len() * 8);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        Ok(bytes)
    }
}

/// Returned by [`Assembler::emit_add`]; binds a mul-pipe mnemonic onto the
/// word just emitted, rewriting it in place rather than appending a new
/// one.
#[derive(Debug)]
pub struct MulBinder<'a> {
    asm: &'a mut Assembler,
    index: usize,
    add_op: AddOp,
    add_dst: Register,
    add_a: ReadOperand,
    add_b: ReadOperand,
    sig: Signal,
    sf: bool,
}

impl<'a> MulBinder<'a> {
    /// The program counter value at the word this binder will rewrite.
    pub fn pc(&self) -> u32 {
        self.asm.pc
    }

    pub fn emit(
        self,
        op: MulOp,
        dst: Register,
        a: ReadOperand,
        b: ReadOperand,
        rotate: Option<Rotate>,
    ) -> Result<(), AssemblerError> {
        if let Some(r) = rotate {
            for operand in [&self.add_a, &self.add_b, &a, &b] {
                if matches!(operand, ReadOperand::SmallImm(_)) {
                    return Err(AssemblerError::SignalConflictsWithImmediate);
                }
            }
            for operand in [&a, &b] {
                let accum_ok = match operand {
                    ReadOperand::Reg(reg) => reg.accum.is_some_and(|m| m < 3),
                    ReadOperand::SmallImm(_) => false,
                };
                if !accum_ok {
                    return Err(AssemblerError::RotateOperandRestriction(
                        "mul inputs must be accumulators r0..r2".to_string(),
                    ));
                }
            }

            let mut read = locate_read_operands([
                self.add_a.clone(),
                self.add_b.clone(),
                a.clone(),
                b.clone(),
            ])?;
            read.raddr_b = match r {
                Rotate::R5 => 48,
                Rotate::By(n) => 48 + n,
            };
            let write = locate_write_operands(Some(&self.add_dst), Some(&dst))?;
            let fields = alu::AluFields {
                op_add: self.add_op.code(),
                op_mul: op.code(),
                read,
                write,
                sig: Signal::AluSmallImm.code(),
                sf: self.sf,
                cond_add: 1,
                cond_mul: 1,
            };
            let word = alu::encode(&fields)?;
            self.asm.words[self.index] = word;
            return Ok(());
        }

        let read = locate_read_operands([self.add_a, self.add_b, a, b])?;
        if read.immediate_flag && self.sig.code() != Signal::AluSmallImm.code() {
            return Err(AssemblerError::SignalConflictsWithImmediate);
        }
        let write = locate_write_operands(Some(&self.add_dst), Some(&dst))?;
        let sf = if matches!(op, MulOp::Nop) { false } else { self.sf };

        let fields = alu::AluFields {
            op_add: self.add_op.code(),
            op_mul: op.code(),
            read,
            write,
            sig: self.sig.code(),
            sf,
            cond_add: 1,
            cond_mul: 1,
        };
        let word = alu::encode(&fields)?;
        self.asm.words[self.index] = word;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immediates::Immediate;
    use crate::registers::{regfile_a, R1};

    #[test]
    fn finalize_with_no_pending_branches_returns_bytes() {
        let mut asm = Assembler::new();
        asm.emit_add(
            AddOp::Nop,
            NULL,
            ReadOperand::default(),
            ReadOperand::default(),
            Signal::NoSignal,
            false,
        )
        .unwrap();
        let bytes = asm.finalize().unwrap();
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn mul_binder_rewrites_in_place_without_advancing_pc() {
        let mut asm = Assembler::new();
        let binder = asm
            .emit_add(
                AddOp::Iadd,
                regfile_a(1),
                ReadOperand::Reg(R0),
                ReadOperand::Reg(R1),
                Signal::NoSignal,
                true,
            )
            .unwrap();
        assert_eq!(binder.pc(), 8);
        binder
            .emit(MulOp::Fmul, regfile_a(2), ReadOperand::Reg(R0), ReadOperand::Reg(R1), None)
            .unwrap();
        assert_eq!(asm.pc(), 8);
        let bytes = asm.finalize().unwrap();
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn duplicate_label_fails() {
        let mut asm = Assembler::new();
        asm.label("loop").unwrap();
        assert!(matches!(
            asm.label("loop"),
            Err(AssemblerError::DuplicateLabel(_))
        ));
    }

    #[test]
    fn undefined_label_fails_at_finalize() {
        let mut asm = Assembler::new();
        asm.branch(BranchCond::Jmp, BranchTarget::Label("nowhere".into()), None, None)
            .unwrap();
        assert!(matches!(
            asm.finalize(),
            Err(AssemblerError::UndefinedLabel(_))
        ));
    }

    #[test]
    fn forward_branch_resolves_to_pipeline_delay_offset() {
        let mut asm = Assembler::new();
        asm.branch(BranchCond::Jmp, BranchTarget::Label("target".into()), None, None)
            .unwrap();
        asm.emit_add(
            AddOp::Nop,
            NULL,
            ReadOperand::default(),
            ReadOperand::default(),
            Signal::NoSignal,
            false,
        )
        .unwrap();
        asm.label("target").unwrap();
        let bytes = asm.finalize().unwrap();
        let word = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        let disp = (word & 0xFFFF_FFFF) as u32 as i32;
        assert_eq!(disp, 16 - 32);
    }

    #[test]
    fn ldi_single_writes_null_on_the_unused_side() {
        let mut asm = Assembler::new();
        asm.ldi_single(regfile_a(0), &Immediate::Int(7)).unwrap();
        let bytes = asm.finalize().unwrap();
        let word = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        assert_eq!(word & 0xFFFF_FFFF, 7);
    }
}
