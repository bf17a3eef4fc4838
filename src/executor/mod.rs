//! Command executor module.
//!
//! Handles subprocess spawning and execution timeouts.

mod runner;
mod subprocess;

pub use runner::{CommandRunner, SystemRunner};
pub use subprocess::{Capture, SubprocessBuilder, SubprocessResult};
