//! The semaphore up/down word.

use crate::assembler::encoder::bits::WordBuilder;
use crate::errors::AssemblerError;
use crate::opcodes::Signal;

pub fn encode(id: u8, up: bool) -> Result<u64, AssemblerError> {
    if id > 15 {
        return Err(AssemblerError::BadSemaphoreId(id));
    }

    let word = WordBuilder::new()
        .field(id as u64, 4)
        .bit(up)
        .field(0, 27) // dontcare
        .field(0, 6) // waddr_mul
        .field(0, 6) // waddr_add
        .bit(false) // ws
        .bit(false) // sf
        .field(1, 3) // cond_mul
        .field(1, 3) // cond_add
        .field(0, 4) // pack
        .bit(false) // pm
        .field(4, 3) // unpack
        .field(Signal::Load.code() as u64, 4)
        .finish();

    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sema_up_sets_sa_bit() {
        let word = encode(3, true).unwrap();
        assert_eq!(word & 0b1111, 3);
        assert_eq!((word >> 4) & 1, 1);
    }

    #[test]
    fn sema_down_clears_sa_bit() {
        let word = encode(3, false).unwrap();
        assert_eq!((word >> 4) & 1, 0);
    }

    #[test]
    fn out_of_range_id_fails() {
        assert!(matches!(
            encode(16, true),
            Err(AssemblerError::BadSemaphoreId(16))
        ));
    }

    #[test]
    fn unpack_field_is_four() {
        let word = encode(0, true).unwrap();
        assert_eq!((word >> 57) & 0b111, 4);
    }
}
