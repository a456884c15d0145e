//! Configuration module
//!
//! Key names and defaults for the current controller, and the
//! configuration-value store they are resolved against.

pub mod params;
pub mod store;

// Re-export the store types; key names stay under `params`
pub use store::{ConfigError, ConfigSource, ConfigStore};
