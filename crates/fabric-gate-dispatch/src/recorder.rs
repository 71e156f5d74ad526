// crates/fabric-gate-dispatch/src/recorder.rs
// ============================================================================
// Module: Audit Recorder
// Description: Best-effort audit persistence with operational-channel fallback.
// Purpose: Record every dispatch attempt without ever failing the dispatch.
// Dependencies: fabric-gate-core, tracing
// ============================================================================

//! ## Overview
//! The recorder wraps the audit storage port. A storage failure is reported
//! on the operational channel and swallowed: audit durability problems must
//! not make the managed API appear broken. Writes are synchronous, so a
//! dispatch that returned to its caller has already had its entry handed to
//! storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fabric_gate_core::AuditEntry;
use fabric_gate_core::AuditStore;

// ============================================================================
// SECTION: Recorder
// ============================================================================

/// Best-effort writer in front of the audit storage port.
///
/// # Invariants
/// - `record` never returns an error and never panics on storage failure.
#[derive(Clone)]
pub struct AuditRecorder {
    /// Underlying audit storage.
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    /// Creates a recorder over the given audit store.
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
        }
    }

    /// Appends one entry, logging storage failures instead of raising them.
    pub fn record(&self, entry: &AuditEntry) {
        if let Err(err) = self.store.append(entry) {
            tracing::error!(
                operation = %entry.operation_name,
                actor = %entry.actor_id,
                error = %err,
                "audit entry could not be persisted"
            );
        }
    }
}
