pub mod calculations;
pub mod models;
pub mod settings;
pub mod tables;

pub use models::*;
pub use tables::{BracketTableRegistry, RegistryError};
