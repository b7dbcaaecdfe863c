//! Convenience forms expressed in terms of the primitive emit calls: move,
//! read, write, wait_dma_*, setup_vpm_*, setup_dma_*, and exit.

use super::Assembler;
use super::encoder::placement::ReadOperand;
use crate::errors::AssemblerError;
use crate::immediates::{pack_small_imm, Immediate, SmallImmValue};
use crate::opcodes::{AddOp, Signal};
use crate::registers::{
    Register, HOST_INTERRUPT, NULL, VPMVCD_RD_SETUP, VPMVCD_WR_SETUP, VPM_LD_ADDR, VPM_LD_WAIT,
    VPM_ST_ADDR, VPM_ST_WAIT,
};

/// The VPM row width for a generic block read/write setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpmSize {
    Bits8,
    Bits16,
    Bits32,
}

impl VpmSize {
    fn code(self) -> u32 {
        match self {
            VpmSize::Bits8 => 0,
            VpmSize::Bits16 => 1,
            VpmSize::Bits32 => 2,
        }
    }
}

impl Assembler {
    /// `mov(dst, src) == bor(dst, src, 0)`.
    pub fn mov(&mut self, dst: Register, src: ReadOperand) -> Result<(), AssemblerError> {
        let zero = pack_small_imm(SmallImmValue::Int(0))?;
        self.emit_add(
            AddOp::Bor,
            dst,
            src,
            ReadOperand::SmallImm(zero),
            Signal::AluSmallImm,
            true,
        )?;
        Ok(())
    }

    /// `read(src) == mov(null, src)`.
    pub fn read(&mut self, src: ReadOperand) -> Result<(), AssemblerError> {
        self.mov(NULL, src)
    }

    /// `write(dst) == mov(dst, null)`.
    pub fn write(&mut self, dst: Register) -> Result<(), AssemblerError> {
        self.mov(dst, ReadOperand::Reg(NULL))
    }

    fn nop_with_signal(&mut self, sig: Signal) -> Result<(), AssemblerError> {
        self.emit_add(
            AddOp::Nop,
            NULL,
            ReadOperand::default(),
            ReadOperand::default(),
            sig,
            false,
        )?;
        Ok(())
    }

    /// `write(host_interrupt)` followed by a `thread end` signal and two
    /// trailing nops for the pipeline drain.
    pub fn exit(&mut self) -> Result<(), AssemblerError> {
        self.write(HOST_INTERRUPT)?;
        self.nop_with_signal(Signal::ThreadEnd)?;
        self.nop_with_signal(Signal::NoSignal)?;
        self.nop_with_signal(Signal::NoSignal)?;
        Ok(())
    }

    /// `wait_dma_load() == read(vpm_ld_wait)`: stalls until a pending DMA
    /// load into the VPM completes.
    pub fn wait_dma_load(&mut self) -> Result<(), AssemblerError> {
        self.read(ReadOperand::Reg(VPM_LD_WAIT))
    }

    /// `wait_dma_store() == read(vpm_st_wait)`: stalls until a pending DMA
    /// store from the VPM completes.
    pub fn wait_dma_store(&mut self) -> Result<(), AssemblerError> {
        self.read(ReadOperand::Reg(VPM_ST_WAIT))
    }

    /// Compose and load the generic block read configuration word.
    pub fn setup_vpm_read(
        &mut self,
        nrows: u8,
        size: VpmSize,
        laned: bool,
        horizontal: bool,
        stride: u16,
        addr_y: u8,
        addr_x: u8,
    ) -> Result<(), AssemblerError> {
        let word = (nrows as u32 & 0x7F) << 20
            | (size.code() & 0x3) << 18
            | (laned as u32) << 17
            | (horizontal as u32) << 16
            | (stride as u32 & 0xFFF) << 4
            | (addr_y as u32 & 0x3F) << 2
            | (addr_x as u32 & 0x3);
        self.ldi_single(VPMVCD_RD_SETUP, &Immediate::Int(word as i32))
    }

    /// Compose and load the generic block write configuration word.
    pub fn setup_vpm_write(
        &mut self,
        size: VpmSize,
        laned: bool,
        horizontal: bool,
        stride: u16,
        addr_y: u8,
        addr_x: u8,
    ) -> Result<(), AssemblerError> {
        let word = (size.code() & 0x3) << 18
            | (laned as u32) << 17
            | (horizontal as u32) << 16
            | (stride as u32 & 0xFFF) << 4
            | (addr_y as u32 & 0x3F) << 2
            | (addr_x as u32 & 0x3);
        self.ldi_single(VPMVCD_WR_SETUP, &Immediate::Int(word as i32))
    }

    /// Compose and load a DMA store configuration word (bit 31 set).
    #[allow(clippy::too_many_arguments)]
    pub fn setup_dma_store(
        &mut self,
        nrows: u8,
        ncols: u8,
        horizontal: bool,
        vpm_addr: u16,
        mode_width: VpmSize,
    ) -> Result<(), AssemblerError> {
        let word = 1u32 << 31
            | (nrows as u32 & 0x7F) << 23
            | (ncols as u32 & 0x7F) << 16
            | (horizontal as u32) << 14
            | (mode_width.code() & 0x3) << 12
            | (vpm_addr as u32 & 0xFFF);
        self.ldi_single(VPM_ST_ADDR, &Immediate::Int(word as i32))
    }

    /// Compose and load a DMA load configuration word (bit 31 set).
    #[allow(clippy::too_many_arguments)]
    pub fn setup_dma_load(
        &mut self,
        nrows: u8,
        ncols: u8,
        vertical: bool,
        vpm_addr: u16,
        mode_width: VpmSize,
        mpitch: u8,
    ) -> Result<(), AssemblerError> {
        let word = 1u32 << 31
            | (mpitch as u32 & 0xF) << 27
            | (nrows as u32 & 0x7F) << 20
            | (ncols as u32 & 0x7F) << 13
            | (vertical as u32) << 12
            | (mode_width.code() & 0x3) << 10
            | (vpm_addr as u32 & 0x3FF);
        self.ldi_single(VPM_LD_ADDR, &Immediate::Int(word as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::regfile_a;

    #[test]
    fn mov_emits_a_single_word() {
        let mut asm = Assembler::new();
        asm.mov(regfile_a(1), ReadOperand::Reg(crate::registers::R0))
            .unwrap();
        assert_eq!(asm.pc(), 8);
    }

    #[test]
    fn exit_emits_four_words() {
        let mut asm = Assembler::new();
        asm.exit().unwrap();
        assert_eq!(asm.pc(), 32);
    }

    #[test]
    fn wait_dma_load_emits_a_single_word() {
        let mut asm = Assembler::new();
        asm.wait_dma_load().unwrap();
        assert_eq!(asm.pc(), 8);
    }

    #[test]
    fn wait_dma_store_emits_a_single_word() {
        let mut asm = Assembler::new();
        asm.wait_dma_store().unwrap();
        assert_eq!(asm.pc(), 8);
    }

    #[test]
    fn setup_dma_store_sets_dma_marker_bit() {
        let mut asm = Assembler::new();
        asm.setup_dma_store(4, 4, true, 0, VpmSize::Bits32).unwrap();
        let bytes = asm.finalize().unwrap();
        let word = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        assert_eq!((word >> 31) & 1, 1);
    }
}
