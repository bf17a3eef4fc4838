//! Lifecycle actions accepted on the command line.

use std::fmt;
use std::str::FromStr;

use crate::error::{SvcctlError, UsageErrorKind};

/// A lifecycle action forwarded to `systemctl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Stop,
    Restart,
    Status,
}

impl Action {
    /// Every accepted action, in the order shown to users.
    pub const ALL: [Action; 4] = [Action::Start, Action::Stop, Action::Restart, Action::Status];

    /// The keyword passed to `systemctl`.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
            Action::Status => "status",
        }
    }

    /// Wording for the success line, e.g. "started".
    pub fn past_tense(self) -> &'static str {
        match self {
            Action::Start => "started",
            Action::Stop => "stopped",
            Action::Restart => "restarted",
            Action::Status => "queried status of",
        }
    }

    /// `"start, stop, restart, status"`
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SvcctlError;

    /// Matching is exact: `Start` or ` start` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| SvcctlError::Usage {
                kind: UsageErrorKind::InvalidAction {
                    action: s.to_string(),
                },
            })
    }
}
