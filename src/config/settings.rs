//! Configuration settings for svcctl.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SvcctlError;
use crate::validation::validate_unit_name;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_ENV_VAR: &str = "SVCCTL_CONFIG";

/// Services acted upon when no configuration overrides them (omit `.service`).
pub const DEFAULT_UNITS: &[&str] = &["nginx", "mysql", "php8.2-fpm"];

/// Whether commands are wrapped with the elevation command by default.
pub const DEFAULT_USE_SUDO: bool = true;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Which units to control and how to reach the service manager.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesConfig {
    /// Ordered unit names.
    #[serde(default = "default_units")]
    pub units: Vec<String>,
    /// Prefix every invocation with `elevation_command`.
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
    /// Privilege-escalation wrapper.
    #[serde(default = "default_elevation_command")]
    pub elevation_command: String,
    /// Service manager control program.
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Limits configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Per-invocation timeout in seconds. Unset means wait indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_units() -> Vec<String> {
    DEFAULT_UNITS.iter().map(|s| s.to_string()).collect()
}

fn default_use_sudo() -> bool {
    DEFAULT_USE_SUDO
}

fn default_elevation_command() -> String {
    "sudo".to_string()
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            use_sudo: default_use_sudo(),
            elevation_command: default_elevation_command(),
            systemctl: default_systemctl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LimitsConfig {
    /// The configured timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SvcctlError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SvcctlError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            SvcctlError::Config { message } => {
                SvcctlError::config(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SvcctlError> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| SvcctlError::config(format!("Failed to parse config: {}", e)))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Resolve settings from the environment.
    ///
    /// Reads the file named by `SVCCTL_CONFIG` when set, otherwise falls
    /// back to the built-in defaults.
    pub fn from_env() -> Result<(Self, Option<PathBuf>), SvcctlError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                let path = PathBuf::from(path);
                let settings = Self::load(&path)?;
                Ok((settings, Some(path)))
            }
            _ => Ok((Self::default(), None)),
        }
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), SvcctlError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(SvcctlError::config(format!(
                "Invalid log level '{}'. Valid levels: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(SvcctlError::config(format!(
                "Invalid log format '{}'. Valid formats: {:?}",
                self.logging.format, valid_formats
            )));
        }

        if self.services.systemctl.trim().is_empty() {
            return Err(SvcctlError::config("services.systemctl cannot be empty"));
        }

        if self.services.use_sudo && self.services.elevation_command.trim().is_empty() {
            return Err(SvcctlError::config(
                "services.elevation_command cannot be empty when use_sudo is set",
            ));
        }

        if self.limits.timeout_seconds == Some(0) {
            return Err(SvcctlError::config(
                "limits.timeout_seconds must be greater than zero",
            ));
        }

        for unit in &self.services.units {
            validate_unit_name(unit)
                .map_err(|e| SvcctlError::config(format!("services.units: {}", e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.services.units, vec!["nginx", "mysql", "php8.2-fpm"]);
        assert!(settings.services.use_sudo);
        assert_eq!(settings.services.elevation_command, "sudo");
        assert_eq!(settings.services.systemctl, "systemctl");
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.format, "pretty");
        assert!(settings.limits.timeout().is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.services.units, default_units());
        assert!(settings.services.use_sudo);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_toml(
            r#"
            [services]
            units = ["redis-server", "postgresql@16-main"]
            use_sudo = false
            systemctl = "/usr/bin/systemctl"

            [logging]
            level = "debug"
            format = "json"

            [limits]
            timeout_seconds = 30
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.services.units,
            vec!["redis-server", "postgresql@16-main"]
        );
        assert!(!settings.services.use_sudo);
        assert_eq!(settings.services.elevation_command, "sudo");
        assert_eq!(settings.services.systemctl, "/usr/bin/systemctl");
        assert_eq!(settings.logging.format, "json");
        assert_eq!(settings.limits.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Settings::from_toml("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(SvcctlError::Config { .. })));
    }

    #[test]
    fn test_invalid_log_format() {
        let result = Settings::from_toml("[logging]\nformat = \"xml\"\n");
        assert!(matches!(result, Err(SvcctlError::Config { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Settings::from_toml("[limits]\ntimeout_seconds = 0\n");
        assert!(matches!(result, Err(SvcctlError::Config { .. })));
    }

    #[test]
    fn test_invalid_unit_rejected() {
        let result = Settings::from_toml("[services]\nunits = [\"nginx\", \"--now\"]\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("--now"));
    }

    #[test]
    fn test_empty_elevation_command() {
        let result = Settings::from_toml("[services]\nelevation_command = \"\"\n");
        assert!(result.is_err());

        let result =
            Settings::from_toml("[services]\nelevation_command = \"\"\nuse_sudo = false\n");
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Settings::from_toml("[services]\nunit = [\"nginx\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Settings::load("/nonexistent/svcctl.toml");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/svcctl.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svcctl.toml");
        std::fs::write(&path, "[services]\nunits = [\"nginx\"]\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.services.units, vec!["nginx"]);
    }
}
