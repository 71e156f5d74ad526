// crates/fabric-gate-core/src/policy.rs
// ============================================================================
// Module: Access Policy Engine
// Description: Ordered allow/deny evaluation for tool dispatch.
// Purpose: Decide per call whether an actor may run an operation on a cluster.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The policy engine reconciles the three independently varying dimensions of
//! every call: caller identity and roles, target cluster, and the global
//! write-protection switch. Evaluation is a pure function with a fixed check
//! order that short-circuits on the first denial, so error messages stay
//! precise and no credential is ever decrypted for a call that fails on
//! cluster access alone. The engine performs no I/O and never blocks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::directory::Actor;
use crate::core::directory::GatewaySettings;
use crate::core::identifiers::ClusterId;
use crate::core::operation::OperationDescriptor;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Reason a dispatch was denied.
///
/// # Invariants
/// - Labels are stable wire values used in audit entries and error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The operation name is not present in the registry snapshot.
    UnknownOperation,
    /// The target cluster is outside the actor's assigned set.
    ClusterNotAssigned,
    /// No held role's operation set contains the operation.
    OperationNotInRole,
    /// The operation is write-shaped and edit mode is not granted.
    EditModeRequired,
}

impl DenyReason {
    /// Returns the stable label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownOperation => "UnknownOperation",
            Self::ClusterNotAssigned => "ClusterNotAssigned",
            Self::OperationNotInRole => "OperationNotInRole",
            Self::EditModeRequired => "EditModeRequired",
        }
    }
}

/// Outcome of a policy evaluation.
///
/// # Invariants
/// - `Deny` carries the first failing check in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The dispatch may proceed.
    Allow,
    /// The dispatch is denied for the given reason.
    Deny(DenyReason),
}

impl Decision {
    /// Returns true when the decision permits dispatch.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates whether `actor` may run `operation` against `cluster_id`.
///
/// Checks run in order and short-circuit on the first denial:
/// 1. the operation must have resolved from the registry snapshot;
/// 2. non-superusers must have the cluster in their assigned set;
/// 3. some held role must permit the operation (administrator roles and
///    superusers permit everything);
/// 4. write-shaped operations additionally require the global edit-mode
///    switch and a role-level edit grant (superusers satisfy the role-level
///    grant but not the global switch, which gates everyone).
#[must_use]
pub fn authorize(
    actor: &Actor,
    operation: Option<&OperationDescriptor>,
    cluster_id: ClusterId,
    settings: GatewaySettings,
) -> Decision {
    let Some(operation) = operation else {
        return Decision::Deny(DenyReason::UnknownOperation);
    };
    if !actor.may_target(cluster_id) {
        return Decision::Deny(DenyReason::ClusterNotAssigned);
    }
    if !actor.is_superuser && !actor.permits_operation(&operation.name) {
        return Decision::Deny(DenyReason::OperationNotInRole);
    }
    if operation.requires_write_mode {
        let role_grant = actor.is_superuser || actor.has_edit_role();
        if !settings.edit_mode_enabled || !role_grant {
            return Decision::Deny(DenyReason::EditModeRequired);
        }
    }
    Decision::Allow
}
