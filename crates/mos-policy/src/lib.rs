#![deny(unsafe_code)]

//! Policy catalog for the MO script compiler.
//!
//! Every object type is rendered by the same engine; what differs between
//! object types lives here as data. A [`PolicyCatalog`] is normally loaded from
//! TOML:
//!
//! ```toml
//! [[policy]]
//! object_type = "Widget"
//! mode = "create-with-attrs"
//! order = ["color", "size"]
//! mandatory = ["size"]
//! ```

pub mod catalog;
pub mod error;
pub mod policy;
pub mod settings;

pub use catalog::PolicyCatalog;
pub use error::{PolicyError, Result};
pub use mos_model::EmissionMode;
pub use policy::{
    CompoundRule, CompoundSort, HeaderPattern, OrderingPolicy, ReferenceRule, ReferenceSource,
    default_id_attribute,
};
pub use settings::{BoundaryMode, ScriptSettings, Settings};
