//! Assembler core for a 16-lane SIMD graphics co-processor instruction
//! set: register catalog, immediate encoders, operand placement solver,
//! instruction encoders, and the emitter that ties them together behind
//! an `Assembler` handle.
//!
//! Surface syntax, macro expansion, file I/O, and uploading assembled
//! code to hardware are all left to a front end built on top of this
//! crate.

pub mod assembler;
pub mod errors;
pub mod immediates;
pub mod opcodes;
pub mod registers;

pub use assembler::{Assembler, BranchTarget, MulBinder, Rotate};
pub use errors::AssemblerError;
