//! Talking to systemd through `systemctl`.
//!
//! Two invocations are made per service: a `list-unit-files` lookup that
//! decides whether the unit is registered at all, and the control command
//! itself. Both are prefixed with the elevation wrapper when configured.

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ServicesConfig;
use crate::error::{CommandErrorKind, SvcctlError};
use crate::executor::{Capture, CommandRunner, SubprocessResult};
use crate::validation::normalize_unit_name;

use super::action::Action;

/// Printed by `systemctl list-unit-files` when nothing matched the filter.
const NO_UNITS_MARKER: &str = "0 unit files listed";

/// Outcome of looking a unit up.
#[derive(Debug)]
pub enum UnitPresence {
    Registered,
    NotRegistered,
    /// The lookup itself could not be completed (tool missing, permission
    /// denied, timeout). Treated as not registered by callers.
    QueryFailed(SvcctlError),
}

/// A control command that did not succeed, with whatever it printed.
#[derive(Debug, Error)]
#[error("{}", brief(.error))]
pub struct ActionFailure {
    /// Combined stdout/stderr of the failed invocation (empty if it never ran).
    pub output: String,
    #[source]
    pub error: SvcctlError,
}

fn brief(error: &SvcctlError) -> String {
    match error {
        SvcctlError::Command { kind } => kind.to_string(),
        other => other.to_string(),
    }
}

/// Builds and runs `systemctl` invocations.
pub struct Systemctl<R> {
    runner: R,
    program: String,
    elevation: Option<String>,
}

impl<R: CommandRunner> Systemctl<R> {
    /// Create a client. `elevation` is the wrapper command, if any.
    pub fn new(runner: R, program: impl Into<String>, elevation: Option<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            elevation,
        }
    }

    pub fn from_config(runner: R, config: &ServicesConfig) -> Self {
        let elevation = config.use_sudo.then(|| config.elevation_command.clone());
        Self::new(runner, config.systemctl.clone(), elevation)
    }

    /// The full argv for a `systemctl` call, wrapper included.
    pub fn command_line(&self, args: &[&str]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        if let Some(wrapper) = &self.elevation {
            argv.push(wrapper.clone());
        }
        argv.push(self.program.clone());
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    fn invoke(&self, args: &[&str], capture: Capture) -> Result<SubprocessResult, SvcctlError> {
        let argv = self.command_line(args);
        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| SvcctlError::config("empty command line"))?;
        self.runner.run(program, rest, capture)
    }

    fn program_name(&self) -> &str {
        self.elevation.as_deref().unwrap_or(&self.program)
    }

    /// Ask systemd whether `service` is a known unit.
    pub fn lookup_unit(&self, service: &str) -> UnitPresence {
        let unit = normalize_unit_name(service);

        // Only stdout is searched; stderr noise must not produce a match.
        let result = match self.invoke(&["list-unit-files", &unit], Capture::Separate) {
            Ok(result) => result,
            Err(e) => return UnitPresence::QueryFailed(e),
        };

        if result.success {
            return if result.stdout.contains(&unit) {
                UnitPresence::Registered
            } else {
                UnitPresence::NotRegistered
            };
        }

        if result.combined_output().contains(NO_UNITS_MARKER) {
            UnitPresence::NotRegistered
        } else {
            UnitPresence::QueryFailed(SvcctlError::Command {
                kind: CommandErrorKind::NonZeroExit {
                    program: self.program_name().to_string(),
                    code: result.exit_code,
                },
            })
        }
    }

    /// True iff the lookup succeeds and lists the normalized unit name.
    pub fn service_exists(&self, service: &str) -> bool {
        match self.lookup_unit(service) {
            UnitPresence::Registered => true,
            UnitPresence::NotRegistered => {
                debug!(service = %service, "Unit not listed by systemd");
                false
            }
            UnitPresence::QueryFailed(e) => {
                warn!(service = %service, error = %e, "Unit lookup failed");
                false
            }
        }
    }

    /// Run `systemctl <action> <service>` once, returning stdout and stderr
    /// interleaved in the order they were written.
    pub fn run_action(&self, action: Action, service: &str) -> Result<String, ActionFailure> {
        debug!(action = %action, service = %service, "Running service action");

        let result = self
            .invoke(&[action.as_str(), service], Capture::Interleaved)
            .map_err(|error| ActionFailure {
                output: String::new(),
                error,
            })?;

        let output = result.combined_output();
        if result.success {
            Ok(output)
        } else {
            warn!(
                action = %action,
                service = %service,
                exit_code = ?result.exit_code,
                "Service action failed"
            );
            Err(ActionFailure {
                output,
                error: SvcctlError::Command {
                    kind: CommandErrorKind::NonZeroExit {
                        program: self.program_name().to_string(),
                        code: result.exit_code,
                    },
                },
            })
        }
    }
}
