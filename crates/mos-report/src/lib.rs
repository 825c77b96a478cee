//! Output generation for MO configuration scripts.
//!
//! - **emit**: one [`mos_model::CommandBlock`] per instance, shaped by the
//!   policy's emission mode
//! - **assemble**: header, diagnostics comments, one section per object type
//!   and the closing sequence

pub mod assemble;
pub mod emit;

pub use assemble::{ScriptHeader, Section, assemble, diagnostic_lines, header_lines};
pub use emit::{emit, keyword};
