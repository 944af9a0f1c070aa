mod loader;

pub use loader::{BracketTableLoader, BracketTableLoaderError, BracketTableRecord};
