//! Failure diagnostics for the recorder

use crate::error::ErrorKind;

/// Receives recorder failures. Configured once at startup, shared read-only.
pub trait FailureReporter: Send + Sync {
    fn report(&self, entity_id: u32, kind: ErrorKind, detail: &str);
}

/// Reports failures as `tracing` warnings
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, entity_id: u32, kind: ErrorKind, detail: &str) {
        tracing::warn!(entity_id, %kind, "Policy monitoring store failure: {}", detail);
    }
}
