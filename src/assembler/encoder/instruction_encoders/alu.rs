//! The ALU word: two pipes (add, mul) packed into one 64-bit word.

use crate::assembler::encoder::bits::WordBuilder;
use crate::assembler::encoder::placement::{reconcile_modifiers, ReadPlacement, WritePlacement};
use crate::errors::AssemblerError;
use crate::opcodes::Signal;

pub struct AluFields {
    pub op_add: u8,
    pub op_mul: u8,
    pub read: ReadPlacement,
    pub write: WritePlacement,
    pub sig: u8,
    pub sf: bool,
    pub cond_add: u8,
    pub cond_mul: u8,
}

pub fn encode(fields: &AluFields) -> Result<u64, AssemblerError> {
    if fields.read.immediate_flag && fields.sig != Signal::AluSmallImm.code() {
        return Err(AssemblerError::SignalConflictsWithImmediate);
    }
    let (pack, unpack, pm) = reconcile_modifiers(fields.write.pack, fields.read.unpack)?;

    let word = WordBuilder::new()
        .field(fields.read.mux_mul_b as u64, 3)
        .field(fields.read.mux_mul_a as u64, 3)
        .field(fields.read.mux_add_b as u64, 3)
        .field(fields.read.mux_add_a as u64, 3)
        .field(fields.read.raddr_b as u64, 6)
        .field(fields.read.raddr_a as u64, 6)
        .field(fields.op_add as u64, 5)
        .field(fields.op_mul as u64, 3)
        .field(fields.write.waddr_mul as u64, 6)
        .field(fields.write.waddr_add as u64, 6)
        .bit(fields.write.ws)
        .bit(fields.sf)
        .field(fields.cond_mul as u64, 3)
        .field(fields.cond_add as u64, 3)
        .field(pack as u64, 4)
        .bit(pm)
        .field(unpack as u64, 3)
        .field(fields.sig as u64, 4)
        .finish();

    Ok(word)
}
