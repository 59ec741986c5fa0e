//! Injectable warning collaborator, mirroring the rest of the workspace's
//! habit of routing diagnostics through `tracing` rather than `eprintln!`.

use tracing::warn;

/// Structured fields attached to a warning emitted while stringifying.
#[derive(Debug, Clone)]
pub struct WarnFields {
    pub error: String,
}

/// Receives warnings raised by the serialization facade when it has to fall
/// back to a plain re-print instead of preserving comments.
///
/// Production code should use [`TracingWarnSink`]; tests can substitute
/// [`RecordingWarnSink`] to assert on what was reported without capturing
/// `tracing` output.
pub trait WarnSink {
    fn warn(&self, fields: WarnFields, message: &str);
}

/// Default [`WarnSink`] that forwards to `tracing::warn!`.
pub struct TracingWarnSink;

impl WarnSink for TracingWarnSink {
    fn warn(&self, fields: WarnFields, message: &str) {
        warn!(error = %fields.error, "{message}");
    }
}

/// Test-oriented [`WarnSink`] that records every warning it receives instead
/// of forwarding it anywhere.
#[derive(Debug, Default)]
pub struct RecordingWarnSink {
    warnings: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingWarnSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(error, message)` pairs for every warning recorded so far.
    pub fn recorded(&self) -> Vec<(String, String)> {
        self.warnings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl WarnSink for RecordingWarnSink {
    fn warn(&self, fields: WarnFields, message: &str) {
        self.warnings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((fields.error, message.to_string()));
    }
}
