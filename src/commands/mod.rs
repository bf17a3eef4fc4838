//! Service lifecycle commands.
//!
//! - [`Action`]: the keyword taken from the command line
//! - [`Systemctl`]: existence check and action invocation
//! - [`ServiceActionRunner`]: the loop over configured services

mod action;
mod runner;
pub(crate) mod systemctl;

pub use action::Action;
pub use runner::{RunSummary, ServiceActionRunner, ServiceOutcome};
pub use systemctl::{ActionFailure, Systemctl, UnitPresence};
