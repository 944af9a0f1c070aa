//! Bracket tables shipped with the crate and the registry that selects one
//! per regime and year.

pub mod builtin;
pub mod registry;

pub use registry::{BracketTableRegistry, RegistryError, TableKey};
