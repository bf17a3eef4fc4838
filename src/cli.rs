//! Command-line argument handling.

use crate::commands::Action;
use crate::error::{SvcctlError, UsageErrorKind};

/// Printed when the argument count is wrong.
pub const USAGE: &str = "Usage: svcctl <start|stop|restart|status>";

/// Parse the arguments that follow the program name.
///
/// Exactly one argument naming an [`Action`] is accepted.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Action, SvcctlError> {
    match args {
        [action] => action.as_ref().parse(),
        _ => Err(SvcctlError::Usage {
            kind: UsageErrorKind::WrongArgumentCount { count: args.len() },
        }),
    }
}

/// The text shown on stdout for a usage error.
pub fn usage_message(error: &SvcctlError) -> String {
    match error {
        SvcctlError::Usage {
            kind: UsageErrorKind::InvalidAction { action },
        } => format!(
            "❌ Invalid action: {}\nAllowed actions: {}",
            action,
            Action::allowed_list()
        ),
        _ => USAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_valid_argument() {
        assert_eq!(parse_args(&["status"]).unwrap(), Action::Status);
    }

    #[test]
    fn test_wrong_argument_count() {
        let none: [&str; 0] = [];
        for args in [&none[..], &["start", "nginx"][..], &["a", "b", "c"][..]] {
            let err = parse_args(args).unwrap_err();
            assert!(matches!(
                err,
                SvcctlError::Usage {
                    kind: UsageErrorKind::WrongArgumentCount { .. }
                }
            ));
            assert_eq!(usage_message(&err), USAGE);
        }
    }

    #[test]
    fn test_invalid_action_message() {
        let err = parse_args(&["reload".to_string()]).unwrap_err();
        assert_eq!(
            usage_message(&err),
            "❌ Invalid action: reload\nAllowed actions: start, stop, restart, status"
        );
    }
}
