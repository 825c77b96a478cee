#![deny(unsafe_code)]

//! Compilation pipeline for MO configuration scripts.
//!
//! [`compile`] runs the whole chain over in-memory tables and a policy
//! catalog and returns the assembled document together with per-section
//! summaries and every diagnostic raised on the way.
//!
//! - **compile**: the pipeline and its result types
//! - **options**: run-specific settings (site, date, empty sections)

pub mod compile;
pub mod options;

pub use compile::{Compilation, SectionSummary, compile};
pub use options::CompileOptions;
