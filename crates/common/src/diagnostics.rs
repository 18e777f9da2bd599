use serde::{Deserialize, Serialize};

/// Severity of a diagnostic event reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Host port for out-of-band diagnostic events.
///
/// The core reports recoverable conditions (dropped frames, unsupported
/// pixel formats, queue overflow) through this sink; it never raises.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, level: DiagnosticLevel, caption: &str, description: &str);
}

/// Default sink that forwards diagnostics to the `tracing` pipeline.
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn emit(&self, level: DiagnosticLevel, caption: &str, description: &str) {
        match level {
            DiagnosticLevel::Info => {
                tracing::info!(caption = %caption, "{}", description);
            }
            DiagnosticLevel::Warning => {
                tracing::warn!(caption = %caption, "{}", description);
            }
            DiagnosticLevel::Error => {
                tracing::error!(caption = %caption, "{}", description);
            }
        }
    }
}
