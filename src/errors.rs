use thiserror::Error;

/// A diagnostic raised while emitting or finalizing a QPU program.
///
/// Every variant corresponds to one of the diagnostic kinds in the
/// assembler's error handling design: a bad instruction halts assembly at
/// the call site that produced it, with no recovery path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblerError {
    #[error("IllegalImmediate: {0} is not representable")]
    IllegalImmediate(String),

    #[error("UnsupportedImmediate: {0}")]
    UnsupportedImmediate(String),

    #[error("TooManyLanes: vector immediate has more than 16 lanes")]
    TooManyLanes,

    #[error("TooManyRegfileA: more than one distinct regfile-A address required")]
    TooManyRegfileA,

    #[error("TooManyRegfileB: more than one distinct regfile-B address required")]
    TooManyRegfileB,

    #[error("NotAReadOperand: register `{0}` cannot be read")]
    NotAReadOperand(String),

    #[error("NotAWriteOperand: register `{0}` cannot be written")]
    NotAWriteOperand(String),

    #[error("MultipleUnpacking: operands disagree on unpack code")]
    MultipleUnpacking,

    #[error("TooManyPacking: more than one write operand carries a pack code")]
    TooManyPacking,

    #[error("InvalidPackUnpackCombination: pack and unpack disagree on `pm`")]
    InvalidPackUnpackCombination,

    #[error("SignalConflictsWithImmediate: a small immediate or rotate forces `alu small imm`")]
    SignalConflictsWithImmediate,

    #[error("RotateOperandRestriction: {0}")]
    RotateOperandRestriction(String),

    #[error("BadDestinationCombination: add_dst/mul_dst cannot share a write slot")]
    BadDestinationCombination,

    #[error("BadDestinationFile: destination register cannot be placed in either file")]
    BadDestinationFile,

    #[error("DuplicateLabel: `{0}` is already defined")]
    DuplicateLabel(String),

    #[error("UndefinedLabel: `{0}` was never defined")]
    UndefinedLabel(String),

    #[error("BadSemaphoreId: {0} is out of range 0..=15")]
    BadSemaphoreId(u8),
}
