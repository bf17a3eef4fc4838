//! Error types for svcctl.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
