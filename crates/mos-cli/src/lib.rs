//! Command-line front end for the MO script compiler.
//!
//! - **cli**: argument definitions
//! - **commands**: `compile` and `policies`
//! - **logging**: `tracing-subscriber` setup
//! - **summary**: comfy-table output

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
