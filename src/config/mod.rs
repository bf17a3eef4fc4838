//! Configuration module for svcctl.
//!
//! Built-in defaults, optionally overridden by a TOML file.

mod settings;

pub use settings::*;
