//! Parsing and validation of `fabric.toml` configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`FabricConfig`] holding the connectivity index sizing parameters and the
//! negotiated-congestion router parameters.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
