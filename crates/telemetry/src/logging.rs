//! Logging bootstrap for the embedding host.
//!
//! The core itself only emits `tracing` events; installing a subscriber
//! is the host's job, done once at plugin load. Initialization is
//! idempotent so test harnesses can share it freely.

use serde::{Deserialize, Serialize};
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable format (default for development)
    Pretty,
    /// Compact text format
    Compact,
    /// JSON format for log aggregation systems
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

impl LogFormat {
    /// Parse log format from the `LOG_FORMAT` environment variable
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ => Self::default(),
        }
    }
}

/// Configuration for structured logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log output format (pretty/compact/json)
    pub format: LogFormat,
    /// Name the embedding host reports itself under
    pub service_name: String,
}

impl LogConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            format: LogFormat::from_env(),
            service_name: service_name.into(),
        }
    }

    /// Override the format picked up from the environment
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber with the given configuration.
///
/// A no-op when a subscriber is already installed, so repeated calls
/// (library tests, multiple plugin instances in one process) are safe.
pub fn init_structured_logging(config: LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("hyper=warn".parse().expect("valid directive"))
        .add_directive("reqwest=warn".parse().expect("valid directive"));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true);
            registry.with(json_layer).try_init().is_ok()
        }
        LogFormat::Compact => {
            let compact_layer = fmt::layer().compact().with_target(true);
            registry.with(compact_layer).try_init().is_ok()
        }
        LogFormat::Pretty => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_target(true)
                .with_line_number(true);
            registry.with(pretty_layer).try_init().is_ok()
        }
    };

    if installed {
        tracing::info!(
            service.name = %config.service_name,
            format = ?config.format,
            "structured logging initialized"
        );
    }
}

/// Install the global subscriber with the format taken from the
/// environment
pub fn init_with_service(service_name: impl Into<String>) {
    init_structured_logging(LogConfig::new(service_name));
}
