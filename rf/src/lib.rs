//! This library generates register files: an array of registers written through input ports and
//! read through output ports, both addressed by the register index on the port opcode.
//!
//! The array is emitted as raw per-dialect code since the [`hwgen_hdl`] object model has no array
//! types.

mod error;
mod register_file;
mod rfgen;

pub use error::Error;
pub use register_file::{RfPort, RegisterFile, RfOptions};
pub use rfgen::{RfGen, GeneratedRf};

pub fn generate(options: &RfOptions, rf: &RegisterFile) -> Result<GeneratedRf, Error> {
    RfGen::new(options, rf)?.run()
}
