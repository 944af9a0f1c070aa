//! Persistent key/value settings and the admin gate that guards them.

pub mod admin;
pub mod store;

pub use admin::{AdminError, AdminGate, AdminSession, AdminSettings};
pub use store::{MemorySettingsStore, SettingsError, SettingsStore};
