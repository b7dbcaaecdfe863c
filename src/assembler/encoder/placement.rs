//! The operand placement solver: assigns up to four read operands to
//! input-mux selectors and up to two write operands to waddr/ws.

use crate::errors::AssemblerError;
use crate::registers::{Register, NULL};

/// One of the four read-operand slots: either a register or a small
/// immediate value already reduced to its 6-bit table code.
#[derive(Debug, Clone)]
pub enum ReadOperand {
    Reg(Register),
    SmallImm(u8),
}

impl Default for ReadOperand {
    fn default() -> Self {
        ReadOperand::Reg(crate::registers::R0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RbSlot {
    Addr(u8),
    Imm(u8),
}

/// Result of solving the four read operands: a mux selector per slot, the
/// two regfile read addresses, whether the B slot carries a small
/// immediate, and the reconciled unpack modifier (if any operand had one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPlacement {
    pub mux_add_a: u8,
    pub mux_add_b: u8,
    pub mux_mul_a: u8,
    pub mux_mul_b: u8,
    pub raddr_a: u8,
    pub raddr_b: u8,
    pub immediate_flag: bool,
    pub unpack: Option<(u8, bool)>,
}

/// Solve placement for the four read operands, in order
/// `(add_a, add_b, mul_a, mul_b)`.
pub fn locate_read_operands(
    ops: [ReadOperand; 4],
) -> Result<ReadPlacement, AssemblerError> {
    let mut unpack: Option<(u8, bool)> = None;
    for op in &ops {
        if let ReadOperand::Reg(r) = op {
            if r.pack.is_some() {
                return Err(AssemblerError::NotAReadOperand(r.name.to_string()));
            }
            if let Some(code) = r.unpack {
                match unpack {
                    None => unpack = Some((code, r.pm)),
                    Some((c, pm)) if c == code && pm == r.pm => {}
                    Some(_) => return Err(AssemblerError::MultipleUnpacking),
                }
            }
        }
    }

    let mut slot_mux: [Option<u8>; 4] = [None; 4];
    let mut raddr_a: Option<u8> = None;
    let mut raddr_b: Option<RbSlot> = None;

    // Step 2 — accumulator assignment.
    for (i, op) in ops.iter().enumerate() {
        if let ReadOperand::Reg(r) = op {
            if let Some(mux) = r.accum {
                slot_mux[i] = Some(mux);
            }
        }
    }

    // Step 4 — file-constrained operands (exactly one readable file, or a
    // small immediate, which is exclusively a B-slot value).
    for (i, op) in ops.iter().enumerate() {
        if slot_mux[i].is_some() {
            continue;
        }
        match op {
            ReadOperand::SmallImm(code) => {
                match raddr_b {
                    None => raddr_b = Some(RbSlot::Imm(*code)),
                    Some(RbSlot::Imm(c)) if c == *code => {}
                    _ => return Err(AssemblerError::TooManyRegfileB),
                }
                slot_mux[i] = Some(7);
            }
            ReadOperand::Reg(r) if r.caps.a_read ^ r.caps.b_read => {
                if r.caps.a_read {
                    match raddr_a {
                        None => raddr_a = Some(r.addr),
                        Some(a) if a == r.addr => {}
                        _ => return Err(AssemblerError::TooManyRegfileA),
                    }
                    slot_mux[i] = Some(6);
                } else {
                    match raddr_b {
                        None => raddr_b = Some(RbSlot::Addr(r.addr)),
                        Some(RbSlot::Addr(a)) if a == r.addr => {}
                        _ => return Err(AssemblerError::TooManyRegfileB),
                    }
                    slot_mux[i] = Some(7);
                }
            }
            _ => {}
        }
    }

    // Step 5 — ambiguous operands (readable from either file).
    for (i, op) in ops.iter().enumerate() {
        if slot_mux[i].is_some() {
            continue;
        }
        let r = match op {
            ReadOperand::Reg(r) => r,
            ReadOperand::SmallImm(_) => unreachable!("small immediates are file-constrained"),
        };
        if !r.caps.a_read && !r.caps.b_read {
            return Err(AssemblerError::NotAReadOperand(r.name.to_string()));
        }
        if raddr_a.is_none() {
            raddr_a = Some(r.addr);
            slot_mux[i] = Some(6);
        } else if raddr_a == Some(r.addr) {
            slot_mux[i] = Some(6);
        } else if raddr_b.is_none() {
            raddr_b = Some(RbSlot::Addr(r.addr));
            slot_mux[i] = Some(7);
        } else if raddr_b == Some(RbSlot::Addr(r.addr)) {
            slot_mux[i] = Some(7);
        } else {
            return Err(AssemblerError::TooManyRegfileA);
        }
    }

    let raddr_a_out = raddr_a.unwrap_or(NULL.addr);
    let (raddr_b_out, immediate_flag) = match raddr_b {
        Some(RbSlot::Addr(a)) => (a, false),
        Some(RbSlot::Imm(c)) => (c, true),
        None => (NULL.addr, false),
    };

    Ok(ReadPlacement {
        mux_add_a: slot_mux[0].expect("add_a always assigned"),
        mux_add_b: slot_mux[1].expect("add_b always assigned"),
        mux_mul_a: slot_mux[2].expect("mul_a always assigned"),
        mux_mul_b: slot_mux[3].expect("mul_b always assigned"),
        raddr_a: raddr_a_out,
        raddr_b: raddr_b_out,
        immediate_flag,
        unpack,
    })
}

/// Result of solving the two write operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePlacement {
    pub waddr_add: u8,
    pub waddr_mul: u8,
    pub ws: bool,
    pub pack: Option<(u8, bool)>,
}

fn write_capable(reg: Option<&Register>, needs_a: bool) -> bool {
    match reg {
        None => true,
        Some(r) => {
            if needs_a {
                r.caps.a_write
            } else {
                r.caps.b_write
            }
        }
    }
}

fn addr_of(reg: Option<&Register>) -> u8 {
    reg.map_or(NULL.addr, |r| r.addr)
}

/// Solve placement for the two write operands. `add_dst` defaults to the
/// add pipe's destination, `mul_dst` to the mul pipe's.
pub fn locate_write_operands(
    add_dst: Option<&Register>,
    mul_dst: Option<&Register>,
) -> Result<WritePlacement, AssemblerError> {
    let packed = [add_dst, mul_dst]
        .into_iter()
        .flatten()
        .filter(|r| r.pack.is_some())
        .count();
    if packed > 1 {
        return Err(AssemblerError::TooManyPacking);
    }

    let ws = if write_capable(add_dst, true) && write_capable(mul_dst, false) {
        false
    } else if write_capable(add_dst, false) && write_capable(mul_dst, true) {
        true
    } else {
        return Err(AssemblerError::BadDestinationCombination);
    };

    let pack = if let Some(r) = mul_dst.filter(|r| r.pack.is_some()) {
        Some((r.pack.unwrap(), true))
    } else {
        add_dst
            .filter(|r| r.pack.is_some())
            .map(|r| (r.pack.unwrap(), false))
    };

    Ok(WritePlacement {
        waddr_add: addr_of(add_dst),
        waddr_mul: addr_of(mul_dst),
        ws,
        pack,
    })
}

/// Reconcile a write-side pack modifier with a read-side unpack modifier
/// into the word's single `pack`, `unpack`, and `pm` fields.
pub fn reconcile_modifiers(
    pack: Option<(u8, bool)>,
    unpack: Option<(u8, bool)>,
) -> Result<(u8, u8, bool), AssemblerError> {
    match (pack, unpack) {
        (Some((p, p_pm)), Some((u, u_pm))) => {
            if p_pm != u_pm {
                return Err(AssemblerError::InvalidPackUnpackCombination);
            }
            Ok((p, u, p_pm))
        }
        (Some((p, pm)), None) => Ok((p, 0, pm)),
        (None, Some((u, pm))) => Ok((0, u, pm)),
        (None, None) => Ok((0, 0, false)),
    }
}
