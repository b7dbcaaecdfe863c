//! The two immediate codecs: the 6-bit small-immediate table shared with
//! the B-file read slot, and the 32-bit load-immediate encoder.

use crate::errors::AssemblerError;

/// A value that can occupy the 6-bit small-immediate slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmallImmValue {
    Int(i32),
    Float(f32),
}

/// A value accepted by the 32-bit load-immediate encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediate {
    Float(f32),
    Int(i32),
    Vector(Vec<i32>),
}

/// Encode a small-immediate value as its 6-bit table code.
///
/// The table is 64 entries: integers `0..15` map to codes `0..15`,
/// integers `-16..-1` to codes `16..31`, `2.0^i` for `i in 0..7` to codes
/// `32..39`, and `2.0^(i-8)` for `i in 0..7` to codes `40..47`. `0` and
/// `0.0` both resolve to code 0.
pub fn pack_small_imm(v: SmallImmValue) -> Result<u8, AssemblerError> {
    if let SmallImmValue::Int(i) = v {
        if (0..=15).contains(&i) {
            return Ok(i as u8);
        }
        if (-16..=-1).contains(&i) {
            return Ok((i + 32) as u8);
        }
    }

    let f = match v {
        SmallImmValue::Int(i) => i as f32,
        SmallImmValue::Float(f) => f,
    };

    for i in 0..8u32 {
        if f == 2f32.powi(i as i32) {
            return Ok(32 + i as u8);
        }
    }
    for i in 0..8u32 {
        if f == 2f32.powi(i as i32 - 8) {
            return Ok(40 + i as u8);
        }
    }

    Err(AssemblerError::IllegalImmediate(format!("{v:?}")))
}

/// Encode a load-immediate value, returning the 32-bit payload word and
/// the 3-bit unpack code that accompanies it.
pub fn pack_imm(v: &Immediate) -> Result<(u32, u8), AssemblerError> {
    match v {
        Immediate::Float(f) => Ok((f.to_bits(), 0)),
        Immediate::Int(i) => Ok((*i as u32, 0)),
        Immediate::Vector(lanes) => pack_vector(lanes),
    }
}

fn pack_vector(lanes: &[i32]) -> Result<(u32, u8), AssemblerError> {
    if lanes.len() > 16 {
        return Err(AssemblerError::TooManyLanes);
    }
    let signed = lanes.iter().any(|&v| v < 0);

    let mut lo: u32 = 0;
    let mut hi: u32 = 0;
    for (i, &lane) in lanes.iter().enumerate() {
        if signed {
            if !(-2..=1).contains(&lane) {
                return Err(AssemblerError::IllegalImmediate(format!(
                    "signed vector lane {lane} out of range [-2,1]"
                )));
            }
        } else if !(0..=3).contains(&lane) {
            return Err(AssemblerError::IllegalImmediate(format!(
                "unsigned vector lane {lane} out of range [0,3]"
            )));
        }
        let bits = (lane as u32) & 0b11;
        let low_bit = bits & 1;
        let high_bit = (bits >> 1) & 1;
        lo |= low_bit << i;
        hi |= high_bit << i;
    }

    let word = (hi << 16) | lo;
    let unpack = 2 * (!signed as u8) + 1;
    Ok((word, unpack))
}
