//! The branch word.

use crate::assembler::encoder::bits::WordBuilder;
use crate::assembler::encoder::placement::locate_write_operands;
use crate::errors::AssemblerError;
use crate::opcodes::{BranchCond, Signal};
use crate::registers::Register;

pub struct BranchFields {
    pub cond: BranchCond,
    pub immediate: u32,
    pub rel: bool,
    pub reg: Option<Register>,
    pub link: Option<Register>,
}

pub fn encode(fields: &BranchFields) -> Result<u64, AssemblerError> {
    let raddr_a = match &fields.reg {
        Some(r) if r.caps.a_read => r.addr & 0x1F,
        Some(r) => return Err(AssemblerError::NotAReadOperand(r.name.to_string())),
        None => 0,
    };
    if let Some(link) = &fields.link {
        if link.pack.is_some() || link.pm {
            return Err(AssemblerError::BadDestinationCombination);
        }
    }
    let write = locate_write_operands(fields.link.as_ref(), None)?;

    let word = WordBuilder::new()
        .field(fields.immediate as u64, 32)
        .field(write.waddr_mul as u64, 6)
        .field(write.waddr_add as u64, 6)
        .bit(write.ws)
        .field(raddr_a as u64, 5)
        .bit(fields.reg.is_some())
        .bit(fields.rel)
        .field(fields.cond.code() as u64, 4)
        .field(0, 4) // dontcare
        .field(Signal::Branch.code() as u64, 4)
        .finish();

    Ok(word)
}
