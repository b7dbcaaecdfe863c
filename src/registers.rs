//! The register catalog: a static table of named registers together with
//! their address and read/write capability flags, and the rules for
//! deriving pack/unpack-modified register values from them.

use crate::errors::AssemblerError;

/// Capability mask for a register: which of the two register files it can
/// be read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub a_read: bool,
    pub b_read: bool,
    pub a_write: bool,
    pub b_write: bool,
}

impl Capabilities {
    const fn new(a_read: bool, b_read: bool, a_write: bool, b_write: bool) -> Self {
        Self {
            a_read,
            b_read,
            a_write,
            b_write,
        }
    }
}

/// An immutable register value, optionally carrying a pack or unpack
/// modifier. Applying a modifier narrows the capability mask and returns a
/// new, derived value; it never mutates the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: &'static str,
    pub addr: u8,
    pub caps: Capabilities,
    /// Mux index (0..=5) for the six accumulators; `None` for every
    /// register that is read through a regfile address instead.
    pub accum: Option<u8>,
    pub pack: Option<u8>,
    pub unpack: Option<u8>,
    pub pm: bool,
}

/// Register R4 is the SFU/TMU result accumulator: the only accumulator on
/// which an unpack modifier is legal, and the only one whose unpack reads
/// both files at once.
const R4_MUX: u8 = 4;

impl Register {
    const fn accumulator(name: &'static str, mux: u8) -> Self {
        Self {
            name,
            addr: 32 + mux,
            caps: Capabilities::new(false, false, true, true),
            accum: Some(mux),
            pack: None,
            unpack: None,
            pm: false,
        }
    }

    const fn regfile_a(name: &'static str, addr: u8) -> Self {
        Self {
            name,
            addr,
            caps: Capabilities::new(true, false, true, false),
            accum: None,
            pack: None,
            unpack: None,
            pm: false,
        }
    }

    const fn regfile_b(name: &'static str, addr: u8) -> Self {
        Self {
            name,
            addr,
            caps: Capabilities::new(false, true, false, true),
            accum: None,
            pack: None,
            unpack: None,
            pm: false,
        }
    }

    const fn special(name: &'static str, addr: u8, caps: Capabilities) -> Self {
        Self {
            name,
            addr,
            caps,
            accum: None,
            pack: None,
            unpack: None,
            pm: false,
        }
    }

    pub fn is_accumulator(&self) -> bool {
        self.accum.is_some()
    }

    fn is_r4(&self) -> bool {
        self.accum == Some(R4_MUX)
    }

    /// Derive a register that reads through an unpack modifier.
    ///
    /// Legal only on R4 (both files become readable, `pm=true`) or on any
    /// A-readable register (capability narrows to A-read only).
    pub fn unpack(&self, code: u8) -> Result<Register, AssemblerError> {
        if self.is_r4() {
            return Ok(Register {
                caps: Capabilities::new(true, true, false, false),
                unpack: Some(code),
                pm: true,
                ..self.clone()
            });
        }
        if self.caps.a_read {
            return Ok(Register {
                caps: Capabilities::new(true, false, false, false),
                unpack: Some(code),
                pm: false,
                ..self.clone()
            });
        }
        Err(AssemblerError::NotAReadOperand(self.name.to_string()))
    }

    /// Derive a register that writes through a pack modifier.
    ///
    /// Non-mul pack requires A-write capability and leaves `pm=false`;
    /// mul-pack requires B-write capability and sets `pm=true`.
    pub fn pack(&self, code: u8, is_mul: bool) -> Result<Register, AssemblerError> {
        if matches!(self.accum, Some(0..=3)) {
            return Err(AssemblerError::NotAWriteOperand(self.name.to_string()));
        }
        if is_mul {
            if !self.caps.b_write {
                return Err(AssemblerError::NotAWriteOperand(self.name.to_string()));
            }
            Ok(Register {
                pack: Some(code),
                pm: true,
                ..self.clone()
            })
        } else {
            if !self.caps.a_write {
                return Err(AssemblerError::NotAWriteOperand(self.name.to_string()));
            }
            Ok(Register {
                pack: Some(code),
                pm: false,
                ..self.clone()
            })
        }
    }
}

/// The null register: address 39, used as the default `raddr_a`/`raddr_b`
/// when a slot is unused, and as a write target to discard a result.
pub const NULL: Register = Register::special(
    "null",
    39,
    Capabilities::new(true, true, true, true),
);

pub const R0: Register = Register::accumulator("r0", 0);
pub const R1: Register = Register::accumulator("r1", 1);
pub const R2: Register = Register::accumulator("r2", 2);
pub const R3: Register = Register::accumulator("r3", 3);
pub const R4: Register = Register::accumulator("r4", 4);
pub const R5: Register = Register::accumulator("r5", 5);

pub const ACCUMULATORS: [Register; 6] = [R0, R1, R2, R3, R4, R5];

/// General-purpose regfile-A registers `ra0..=ra31`.
pub fn regfile_a(addr: u8) -> Register {
    Register::regfile_a(ra_name(addr), addr)
}

/// General-purpose regfile-B registers `rb0..=rb31`.
pub fn regfile_b(addr: u8) -> Register {
    Register::regfile_b(rb_name(addr), addr)
}

const RA_NAMES: [&str; 32] = [
    "ra0", "ra1", "ra2", "ra3", "ra4", "ra5", "ra6", "ra7", "ra8", "ra9", "ra10", "ra11", "ra12",
    "ra13", "ra14", "ra15", "ra16", "ra17", "ra18", "ra19", "ra20", "ra21", "ra22", "ra23",
    "ra24", "ra25", "ra26", "ra27", "ra28", "ra29", "ra30", "ra31",
];

const RB_NAMES: [&str; 32] = [
    "rb0", "rb1", "rb2", "rb3", "rb4", "rb5", "rb6", "rb7", "rb8", "rb9", "rb10", "rb11", "rb12",
    "rb13", "rb14", "rb15", "rb16", "rb17", "rb18", "rb19", "rb20", "rb21", "rb22", "rb23",
    "rb24", "rb25", "rb26", "rb27", "rb28", "rb29", "rb30", "rb31",
];

fn ra_name(addr: u8) -> &'static str {
    RA_NAMES[addr as usize]
}

fn rb_name(addr: u8) -> &'static str {
    RB_NAMES[addr as usize]
}

// --- Special-purpose I/O registers -----------------------------------

pub const UNIFORM_READ: Register = Register::special(
    "uniform_read",
    32,
    Capabilities::new(true, true, false, false),
);
pub const VARYING_READ: Register = Register::special(
    "varying_read",
    35,
    Capabilities::new(true, true, false, false),
);
pub const ELEMENT_NUMBER: Register = Register::special(
    "element_number",
    38,
    Capabilities::new(true, false, false, false),
);
pub const QPU_NUMBER: Register = Register::special(
    "qpu_number",
    38,
    Capabilities::new(false, true, false, false),
);
pub const HOST_INTERRUPT: Register = Register::special(
    "host_interrupt",
    38,
    Capabilities::new(false, false, true, true),
);
pub const MUTEX_ACQUIRE: Register = Register::special(
    "mutex_acquire",
    24,
    Capabilities::new(true, true, false, false),
);
pub const MUTEX_RELEASE: Register = Register::special(
    "mutex_release",
    24,
    Capabilities::new(false, false, true, true),
);
pub const SFU_RECIP: Register = Register::special(
    "sfu_recip",
    37,
    Capabilities::new(false, false, true, true),
);
pub const SFU_RECIPSQRT: Register = Register::special(
    "sfu_recipsqrt",
    38,
    Capabilities::new(false, false, true, true),
);
pub const SFU_EXP: Register = Register::special(
    "sfu_exp",
    39,
    Capabilities::new(false, false, true, true),
);
pub const SFU_LOG: Register = Register::special(
    "sfu_log",
    40,
    Capabilities::new(false, false, true, true),
);
pub const TMU0_S: Register = Register::special(
    "tmu0_s",
    41,
    Capabilities::new(false, false, true, true),
);
pub const TMU0_T: Register = Register::special(
    "tmu0_t",
    42,
    Capabilities::new(false, false, true, true),
);
pub const TMU0_R: Register = Register::special(
    "tmu0_r",
    43,
    Capabilities::new(false, false, true, true),
);
pub const TMU0_B: Register = Register::special(
    "tmu0_b",
    44,
    Capabilities::new(false, false, true, true),
);
pub const TMU1_S: Register = Register::special(
    "tmu1_s",
    45,
    Capabilities::new(false, false, true, true),
);
pub const TMU1_T: Register = Register::special(
    "tmu1_t",
    46,
    Capabilities::new(false, false, true, true),
);
pub const TMU1_R: Register = Register::special(
    "tmu1_r",
    47,
    Capabilities::new(false, false, true, true),
);
pub const TMU1_B: Register = Register::special(
    "tmu1_b",
    48,
    Capabilities::new(false, false, true, true),
);
pub const TMU_NOSWAP: Register = Register::special(
    "tmu_noswap",
    49,
    Capabilities::new(false, false, true, true),
);
pub const VPM: Register = Register::special(
    "vpm",
    50,
    Capabilities::new(true, true, true, true),
);
pub const VPM_LD_BUSY: Register = Register::special(
    "vpm_ld_busy",
    51,
    Capabilities::new(true, false, false, false),
);
pub const VPM_ST_BUSY: Register = Register::special(
    "vpm_st_busy",
    51,
    Capabilities::new(false, true, false, false),
);
pub const VPMVCD_RD_SETUP: Register = Register::special(
    "vpmvcd_rd_setup",
    52,
    Capabilities::new(false, false, true, false),
);
pub const VPMVCD_WR_SETUP: Register = Register::special(
    "vpmvcd_wr_setup",
    52,
    Capabilities::new(false, false, false, true),
);
pub const VPM_LD_ADDR: Register = Register::special(
    "vpm_ld_addr",
    53,
    Capabilities::new(false, false, true, false),
);
pub const VPM_ST_ADDR: Register = Register::special(
    "vpm_st_addr",
    53,
    Capabilities::new(false, false, false, true),
);
pub const VPM_LD_WAIT: Register = Register::special(
    "vpm_ld_wait",
    54,
    Capabilities::new(true, false, false, false),
);
pub const VPM_ST_WAIT: Register = Register::special(
    "vpm_st_wait",
    54,
    Capabilities::new(false, true, false, false),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r4_unpack_opens_both_files() {
        let r = R4.unpack(2).unwrap();
        assert!(r.caps.a_read && r.caps.b_read);
        assert!(r.pm);
        assert_eq!(r.unpack, Some(2));
    }

    #[test]
    fn accumulator_r0_rejects_unpack() {
        assert!(R0.unpack(1).is_err());
    }

    #[test]
    fn accumulators_r0_through_r3_reject_pack() {
        assert!(R0.pack(1, false).is_err());
        assert!(R1.pack(1, true).is_err());
        assert!(R2.pack(1, false).is_err());
        assert!(R3.pack(1, true).is_err());
    }

    #[test]
    fn a_readable_register_unpack_narrows_to_a_read() {
        let r = regfile_a(3).unpack(1).unwrap();
        assert!(r.caps.a_read && !r.caps.b_read);
    }

    #[test]
    fn mul_pack_requires_b_write() {
        assert!(regfile_a(1).pack(1, true).is_err());
        assert!(regfile_b(1).pack(1, true).is_ok());
    }

    #[test]
    fn non_mul_pack_requires_a_write() {
        assert!(regfile_b(1).pack(1, false).is_err());
        let r = regfile_a(1).pack(1, false).unwrap();
        assert!(!r.pm);
    }
}
