// crates/fabric-gate-core/src/core/directory.rs
// ============================================================================
// Module: Directory Records
// Description: Actor, role, cluster, and settings records read per call.
// Purpose: Carry request-scoped copies of externally persisted identity state.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Directory records are transient, request-scoped copies of state owned by
//! the storage collaborator: who is calling, which roles they hold, which
//! clusters they may target, and the global gateway switches. The gateway
//! never mutates these records; writes belong to the admin surface outside
//! this codebase.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::ClusterId;
use crate::core::identifiers::OperationName;
use crate::core::identifiers::RoleId;

// ============================================================================
// SECTION: Sealed Credentials
// ============================================================================

/// Encrypted credential blob as stored at rest.
///
/// # Invariants
/// - Holds ciphertext only; the plaintext never appears outside a vault
///   decryption scope, in any log, or in any error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedCredential(String);

impl SealedCredential {
    /// Wraps an already-sealed credential string.
    #[must_use]
    pub fn new(sealed: impl Into<String>) -> Self {
        Self(sealed.into())
    }

    /// Returns the sealed wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SealedCredential {
    /// Displays a fixed placeholder; the ciphertext itself is never printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[sealed credential]")
    }
}

// ============================================================================
// SECTION: Cluster Records
// ============================================================================

/// One managed backend cluster.
///
/// # Invariants
/// - `name` is unique across clusters.
/// - `credential` stays sealed outside a vault scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Cluster identifier.
    pub id: ClusterId,
    /// Unique cluster name.
    pub name: String,
    /// Base URL of the cluster API endpoint.
    pub base_url: String,
    /// Username presented to the cluster.
    pub username: String,
    /// Encrypted credential blob.
    pub credential: SealedCredential,
    /// Whether outbound TLS certificates are verified for this cluster.
    pub verify_ssl: bool,
    /// Whether the cluster accepts dispatches.
    pub is_active: bool,
}

// ============================================================================
// SECTION: Role Records
// ============================================================================

/// One RBAC role with its permitted operation set.
///
/// # Invariants
/// - `is_administrator` roles implicitly permit every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Whether this role grants write-shaped operations.
    pub edit_mode_enabled: bool,
    /// Built-in unrestricted role flag.
    pub is_administrator: bool,
    /// Operation names this role permits.
    pub operations: BTreeSet<OperationName>,
}

// ============================================================================
// SECTION: Actors
// ============================================================================

/// Authenticated caller identity with resolved role and cluster sets.
///
/// # Invariants
/// - An empty `assigned_clusters` set grants access to all clusters only
///   when `is_superuser` is set; otherwise it grants none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor identifier.
    pub id: ActorId,
    /// Login name, used for audit attribution.
    pub username: String,
    /// Roles held by the actor.
    pub roles: Vec<RoleRecord>,
    /// Clusters the actor may target.
    pub assigned_clusters: BTreeSet<ClusterId>,
    /// Unrestricted access flag.
    pub is_superuser: bool,
}

impl Actor {
    /// Returns true when any held role permits the operation.
    #[must_use]
    pub fn permits_operation(&self, name: &OperationName) -> bool {
        self.roles
            .iter()
            .any(|role| role.is_administrator || role.operations.contains(name))
    }

    /// Returns true when any held role grants write-shaped operations.
    #[must_use]
    pub fn has_edit_role(&self) -> bool {
        self.roles.iter().any(|role| role.edit_mode_enabled)
    }

    /// Returns true when the actor may target the given cluster.
    #[must_use]
    pub fn may_target(&self, cluster_id: ClusterId) -> bool {
        self.is_superuser || self.assigned_clusters.contains(&cluster_id)
    }
}

// ============================================================================
// SECTION: Gateway Settings
// ============================================================================

/// Global gateway switches read per call through the storage port.
///
/// # Invariants
/// - A snapshot; the storage implementation decides its freshness policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Global write-protection switch; false blocks all write-shaped calls.
    pub edit_mode_enabled: bool,
}
