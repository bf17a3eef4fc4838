//! svcctl library
//!
//! Applies a lifecycle action (start, stop, restart, status) to a list of
//! systemd services, checking that each unit is registered before acting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod validation;
