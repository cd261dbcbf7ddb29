//! Provides utilities to initialize logging.
use std::env;

use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "HDKEYCHAIN_SVC_LABEL";

/// Set to `1` to annotate events with their source file.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Set to `1` to annotate events with their line number.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    /// Annotate events with their source file.
    with_file: bool,

    /// Annotate events with their line number.
    with_line_number: bool,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set and no source annotations.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            with_file: false,
            with_line_number: false,
        }
    }

    /// Creates a new instance with the whoami string built from `base` and
    /// the source annotations read from the environment.
    pub fn with_base_name(base: &str) -> Self {
        Self {
            whoami: get_whoami_string(base),
            with_file: env_flag(LOG_FILE_ENVVAR),
            with_line_number: env_flag(LOG_LINE_NUM_ENVVAR),
        }
    }

    /// Sets whether events carry their source file.
    pub fn set_with_file(&mut self, with_file: bool) {
        self.with_file = with_file;
    }

    /// Sets whether events carry their line number.
    pub fn set_with_line_number(&mut self, with_line_number: bool) {
        self.with_line_number = with_line_number;
    }

    /// The whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(hdkeychain)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// The filter comes from `RUST_LOG`. A second call leaves the installed
/// subscriber in place.
pub fn init(config: LoggerConfig) {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    // Stdout logging.
    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(config.with_file)
                .with_line_number(config.with_line_number),
        )
        .with_filter(filt);

    if tracing_subscriber::registry()
        .with(stdout_sub)
        .try_init()
        .is_err()
    {
        debug!(whoami = %config.whoami, "logging already initialized");
        return;
    }

    info!(whoami = %config.whoami, "logging started");
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1")
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    whoami_with_label(base, get_service_label_from_env().as_deref())
}

fn whoami_with_label(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
