//! Transformation stages of the MO script compiler.
//!
//! - **normalize**: raw cells to canonical strings
//! - **parse**: sparse tables to raw per-column instances
//! - **compound**: sub-key ordering and repeated groups
//! - **resolve**: identifiers, compound grouping and references
//! - **project**: declared order, defaults and the lexical tail

pub mod compound;
pub mod normalize;
pub mod parse;
pub mod project;
pub mod resolve;

pub use normalize::{normalize, normalize_str};
pub use parse::{ParsedTables, effective_object_types, parse_table, parse_tables};
pub use project::{Origin, ProjectedAttribute, project};
pub use resolve::{Identity, InstanceIndex, Resolved, ResolvedSet, Resolver, resolve_all};
