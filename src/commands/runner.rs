//! The per-service loop.
//!
//! Every service is checked and, if registered, acted upon in list order.
//! Nothing that happens to an individual service stops the loop; only a
//! failure to write the report itself is returned as an error.

use std::io::Write;

use tracing::{info, info_span};
use uuid::Uuid;

use crate::error::SvcctlError;
use crate::executor::CommandRunner;

use super::action::Action;
use super::systemctl::Systemctl;

/// What happened to a single service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// The unit was not found; no action was attempted.
    Skipped,
    Succeeded,
    Failed,
}

/// Tally of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ServiceOutcome) {
        match outcome {
            ServiceOutcome::Skipped => self.skipped += 1,
            ServiceOutcome::Succeeded => self.succeeded += 1,
            ServiceOutcome::Failed => self.failed += 1,
        }
    }
}

/// Applies one action to an ordered list of services.
pub struct ServiceActionRunner<'a, R> {
    systemctl: &'a Systemctl<R>,
    services: &'a [String],
}

impl<'a, R: CommandRunner> ServiceActionRunner<'a, R> {
    pub fn new(systemctl: &'a Systemctl<R>, services: &'a [String]) -> Self {
        Self {
            systemctl,
            services,
        }
    }

    /// Run `action` against every service, writing the report to `out`.
    pub fn run<W: Write>(&self, action: Action, out: &mut W) -> Result<RunSummary, SvcctlError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", run_id = %run_id, action = %action);
        let _guard = span.enter();

        writeln!(out, "▶️  Performing '{}' on services...\n", action)?;

        let mut summary = RunSummary::default();
        for service in self.services {
            let outcome = self.run_one(action, service, out)?;
            summary.record(outcome);
        }

        writeln!(out, "✅ Done.")?;
        out.flush()?;

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Run complete"
        );
        Ok(summary)
    }

    fn run_one<W: Write>(
        &self,
        action: Action,
        service: &str,
        out: &mut W,
    ) -> Result<ServiceOutcome, SvcctlError> {
        writeln!(out, "🔍 Checking service: {}", service)?;

        if !self.systemctl.service_exists(service) {
            writeln!(out, "⚠️  Service '{}' not recognized by systemd.\n", service)?;
            return Ok(ServiceOutcome::Skipped);
        }

        match self.systemctl.run_action(action, service) {
            Ok(output) => {
                writeln!(out, "✅ Successfully {} {}", action.past_tense(), service)?;
                if action == Action::Status {
                    writeln!(out, "--- Status Output ---")?;
                    writeln!(out, "{}", output.trim())?;
                    writeln!(out, "---------------------")?;
                }
                writeln!(out)?;
                Ok(ServiceOutcome::Succeeded)
            }
            Err(failure) => {
                writeln!(
                    out,
                    "❌ Failed to {} {}: {}\nOutput:\n{}\n",
                    action, service, failure, failure.output
                )?;
                Ok(ServiceOutcome::Failed)
            }
        }
    }
}
