// crates/fabric-gate-core/src/interfaces.rs
// ============================================================================
// Module: Storage Port Interfaces
// Description: Backend-agnostic directory and audit storage contracts.
// Purpose: Keep the policy engine and dispatcher testable without a database.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The gateway reads identity and cluster state and appends audit entries
//! through these ports. Implementations must be safe to share across
//! concurrent dispatches. The gateway only ever reads directory state; role
//! and cluster writes belong to the external admin surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::audit::AuditEntry;
use crate::core::audit::AuditQuery;
use crate::core::audit::AuditStatistics;
use crate::core::directory::Actor;
use crate::core::directory::ClusterRecord;
use crate::core::directory::GatewaySettings;
use crate::core::identifiers::ClusterId;

// ============================================================================
// SECTION: Directory Store
// ============================================================================

/// Directory storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Directory storage I/O failure.
    #[error("directory store io error: {0}")]
    Io(String),
    /// Directory data failed to decode.
    #[error("directory store invalid data: {0}")]
    Invalid(String),
}

/// Read-only directory of actors, clusters, and gateway settings.
pub trait DirectoryStore: Send + Sync {
    /// Resolves an opaque actor token to an active actor, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    fn resolve_token(&self, token: &str) -> Result<Option<Actor>, DirectoryError>;

    /// Fetches one cluster record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    fn cluster(&self, id: ClusterId) -> Result<Option<ClusterRecord>, DirectoryError>;

    /// Fetches one cluster record by unique name.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    fn cluster_by_name(&self, name: &str) -> Result<Option<ClusterRecord>, DirectoryError>;

    /// Lists cluster records, optionally restricted to active ones.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the listing fails.
    fn clusters(&self, active_only: bool) -> Result<Vec<ClusterRecord>, DirectoryError>;

    /// Reads the current global gateway switches.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the read fails.
    fn settings(&self) -> Result<GatewaySettings, DirectoryError>;
}

// ============================================================================
// SECTION: Audit Store
// ============================================================================

/// Audit storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Failures are logged by the recorder and never re-raised to fail a
///   dispatch.
#[derive(Debug, Error)]
pub enum AuditStoreError {
    /// Audit storage I/O failure.
    #[error("audit store io error: {0}")]
    Io(String),
    /// Audit data failed to encode or decode.
    #[error("audit store invalid data: {0}")]
    Invalid(String),
}

/// Append-only audit trail storage.
pub trait AuditStore: Send + Sync {
    /// Appends one audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the underlying storage is
    /// unavailable.
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError>;

    /// Reads entries matching the query, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the read fails.
    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError>;

    /// Computes aggregate counters over the trail.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the read fails.
    fn statistics(&self) -> Result<AuditStatistics, AuditStoreError>;
}
