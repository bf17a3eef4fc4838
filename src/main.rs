//! svcctl - apply start/stop/restart/status to a fixed set of systemd services.

use std::env;
use std::io;
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use svcctl::cli::{parse_args, usage_message};
use svcctl::commands::{ServiceActionRunner, Systemctl};
use svcctl::config::{LoggingConfig, Settings};
use svcctl::executor::SystemRunner;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    // Argument errors abort before any config is read or process spawned
    let action = match parse_args(&args) {
        Ok(action) => action,
        Err(e) => {
            println!("{}", usage_message(&e));
            return ExitCode::FAILURE;
        }
    };

    let (settings, config_path) = match Settings::from_env() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.logging);
    match &config_path {
        Some(path) => debug!(path = %path.display(), "Configuration loaded"),
        None => debug!("Using built-in configuration"),
    }

    let runner = SystemRunner::new(settings.limits.timeout());
    let systemctl = Systemctl::from_config(runner, &settings.services);
    let services = ServiceActionRunner::new(&systemctl, &settings.services.units);

    // Past argument validation the exit status is always 0, even if the
    // report could not be written.
    if let Err(e) = services.run(action, &mut io::stdout().lock()) {
        error!(error = %e, "Failed to write report");
    }
    ExitCode::SUCCESS
}

/// Initialize logging on stderr so stdout carries only the report.
fn init_logging(logging: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(io::stderr))
                .init();
        }
    }
}
