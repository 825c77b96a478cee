//! Data model for the managed-object script compiler.
//!
//! - **cell**: raw spreadsheet values
//! - **table**: attribute tables and their resolved column layout
//! - **instance**: raw and resolved instances, compound attributes, references
//! - **block**: emission modes and rendered command blocks
//! - **diagnostic**: non-fatal findings surfaced in the output document

pub mod block;
pub mod cell;
pub mod diagnostic;
pub mod error;
pub mod instance;
pub mod table;

pub use block::{CommandBlock, EmissionMode};
pub use cell::Cell;
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{Result, TableError};
pub use instance::{
    AttributeValue, CompoundAttribute, IdSource, InstanceRecord, RawInstance, Reference,
    Resolution, SourceColumn,
};
pub use table::{AttributeTable, ColumnLayout, InstanceColumn, column_letter};
