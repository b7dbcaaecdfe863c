//! The load-immediate word.

use crate::assembler::encoder::bits::WordBuilder;
use crate::assembler::encoder::placement::WritePlacement;
use crate::errors::AssemblerError;
use crate::opcodes::Signal;
use crate::registers::Register;

pub struct LoadFields {
    pub immediate: u32,
    pub unpack: u8,
    pub dst_a: Register,
    pub dst_b: Register,
}

/// Build the write placement for a load-immediate destination pair,
/// swapping `(dst_a, dst_b)` into `(dst_b, dst_a)` if the first assignment
/// is not capability-valid.
pub fn place_destinations(
    dst_a: &Register,
    dst_b: &Register,
) -> Result<WritePlacement, AssemblerError> {
    if dst_a.caps.a_write && dst_b.caps.b_write {
        return Ok(WritePlacement {
            waddr_add: dst_a.addr,
            waddr_mul: dst_b.addr,
            ws: false,
            pack: None,
        });
    }
    if dst_b.caps.a_write && dst_a.caps.b_write {
        return Ok(WritePlacement {
            waddr_add: dst_b.addr,
            waddr_mul: dst_a.addr,
            ws: false,
            pack: None,
        });
    }
    Err(AssemblerError::BadDestinationFile)
}

pub fn encode(fields: &LoadFields) -> Result<u64, AssemblerError> {
    let write = place_destinations(&fields.dst_a, &fields.dst_b)?;

    let word = WordBuilder::new()
        .field(fields.immediate as u64, 32)
        .field(write.waddr_mul as u64, 6)
        .field(write.waddr_add as u64, 6)
        .bit(false) // ws
        .bit(false) // sf
        .field(1, 3) // cond_mul
        .field(1, 3) // cond_add
        .field(0, 4) // pack
        .bit(false) // pm
        .field(fields.unpack as u64, 3)
        .field(Signal::Load.code() as u64, 4)
        .finish();

    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{regfile_a, regfile_b, NULL};

    #[test]
    fn load_to_single_destination_defaults_b_to_null() {
        let fields = LoadFields {
            immediate: 42,
            unpack: 0,
            dst_a: regfile_a(1),
            dst_b: NULL,
        };
        let word = encode(&fields).unwrap();
        assert_eq!(word & 0xFFFF_FFFF, 42);
        assert_eq!(word >> 60, Signal::Load.code() as u64);
    }

    #[test]
    fn swapped_destinations_are_reordered() {
        let fields = LoadFields {
            immediate: 7,
            unpack: 0,
            dst_a: regfile_b(3),
            dst_b: regfile_a(4),
        };
        assert!(encode(&fields).is_ok());
    }

    #[test]
    fn incompatible_destinations_fail() {
        let dst_a = regfile_b(1);
        let dst_b = regfile_b(2);
        assert!(place_destinations(&dst_a, &dst_b).is_err());
    }
}
