//! Unit name validation.
//!
//! Unit names are passed straight to the service manager as arguments, so
//! anything that could be read as an option or that systemd would never
//! accept is rejected up front.

use crate::error::{SvcctlError, ValidationErrorKind};

/// Suffix systemd uses for service units.
pub const SERVICE_SUFFIX: &str = ".service";

/// Append `.service` unless the name already carries it.
///
/// # Example
///
/// ```
/// use svcctl::validation::normalize_unit_name;
///
/// assert_eq!(normalize_unit_name("nginx"), "nginx.service");
/// assert_eq!(normalize_unit_name("nginx.service"), "nginx.service");
/// ```
pub fn normalize_unit_name(name: &str) -> String {
    if name.ends_with(SERVICE_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, SERVICE_SUFFIX)
    }
}

fn is_unit_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | ':' | '\\')
}

/// Validate a unit name before it is handed to the service manager.
///
/// # Example
///
/// ```
/// use svcctl::validation::validate_unit_name;
///
/// assert!(validate_unit_name("php8.2-fpm").is_ok());
/// assert!(validate_unit_name("--now").is_err());
/// ```
pub fn validate_unit_name(name: &str) -> Result<(), SvcctlError> {
    if name.is_empty() {
        return Err(SvcctlError::Validation {
            kind: ValidationErrorKind::EmptyUnitName,
        });
    }

    if name.starts_with('-') {
        return Err(SvcctlError::Validation {
            kind: ValidationErrorKind::InvalidUnitName {
                unit: name.to_string(),
                message: "must not start with '-'".to_string(),
            },
        });
    }

    if let Some(bad) = name.chars().find(|c| !is_unit_char(*c)) {
        return Err(SvcctlError::Validation {
            kind: ValidationErrorKind::InvalidUnitName {
                unit: name.to_string(),
                message: format!("character {:?} is not allowed", bad),
            },
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_suffix() {
        assert_eq!(normalize_unit_name("mysql"), "mysql.service");
        assert_eq!(normalize_unit_name("php8.2-fpm"), "php8.2-fpm.service");
    }

    #[test]
    fn test_normalize_keeps_existing_suffix() {
        assert_eq!(normalize_unit_name("mysql.service"), "mysql.service");
    }

    #[test]
    fn test_normalize_other_unit_types() {
        // Only `.service` is recognised as a suffix.
        assert_eq!(normalize_unit_name("backup.timer"), "backup.timer.service");
    }

    #[test]
    fn test_valid_names() {
        assert!(validate_unit_name("nginx").is_ok());
        assert!(validate_unit_name("php8.2-fpm").is_ok());
        assert!(validate_unit_name("redis-server.service").is_ok());
        assert!(validate_unit_name("postgresql@16-main").is_ok());
        assert!(validate_unit_name("dev-disk-by\\x2duuid").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert!(matches!(
            validate_unit_name(""),
            Err(SvcctlError::Validation {
                kind: ValidationErrorKind::EmptyUnitName
            })
        ));
    }

    #[test]
    fn test_option_injection() {
        assert!(validate_unit_name("-H").is_err());
        assert!(validate_unit_name("--now").is_err());
    }

    #[test]
    fn test_injection_attempts() {
        assert!(validate_unit_name("nginx;rm").is_err());
        assert!(validate_unit_name("a b").is_err());
        assert!(validate_unit_name("nginx\nmalicious").is_err());
        assert!(validate_unit_name("../etc/passwd").is_err());
    }
}
