//! Configuration Module
//!
//! The persisted configuration document, its snapshot loader/validator,
//! and the atomic writer.

pub mod secrets;
pub mod snapshot;
mod types;

pub use secrets::SecretString;
pub use snapshot::{ConfigIssue, ConfigSnapshot, load_snapshot, write_config};
pub use types::*;
