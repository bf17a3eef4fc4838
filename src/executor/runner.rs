//! The seam between service logic and real process spawning.

use std::time::Duration;

use crate::error::SvcctlError;

use super::subprocess::{Capture, SubprocessBuilder, SubprocessResult};

/// Runs an external program and captures its result.
///
/// A non-zero exit is reported through [`SubprocessResult::success`]; `Err`
/// is reserved for failures to run the program at all.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        capture: Capture,
    ) -> Result<SubprocessResult, SvcctlError>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        capture: Capture,
    ) -> Result<SubprocessResult, SvcctlError> {
        SubprocessBuilder::new(program)
            .args(args)
            .capture(capture)
            .timeout(self.timeout)
            .run()
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[String],
        capture: Capture,
    ) -> Result<SubprocessResult, SvcctlError> {
        (**self).run(program, args, capture)
    }
}
