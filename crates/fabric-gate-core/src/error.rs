// crates/fabric-gate-core/src/error.rs
// ============================================================================
// Module: Gateway Error Taxonomy
// Description: Stable error kinds surfaced to callers and audit entries.
// Purpose: Classify every dispatch failure without leaking credentials.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The gateway error taxonomy separates expected, frequent outcomes (policy
//! denials, backend error statuses) from configuration faults (registry parse
//! failures, credential decryption failures) and transient transport
//! failures. Kind labels are stable wire values. No variant ever carries
//! plaintext or ciphertext credential material.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ClusterId;
use crate::core::identifiers::OperationName;
use crate::policy::DenyReason;

// ============================================================================
// SECTION: Error Kinds
// ============================================================================

/// Stable machine-readable labels for gateway errors.
///
/// # Invariants
/// - Labels are part of the caller-facing wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Operation name not present in the registry snapshot.
    UnknownOperation,
    /// Target cluster outside the actor's assigned set.
    ClusterNotAssigned,
    /// No held role permits the operation.
    OperationNotInRole,
    /// Write-shaped operation without an edit-mode grant.
    EditModeRequired,
    /// No cluster record exists for the requested target.
    ClusterNotFound,
    /// The cluster record is marked inactive.
    ClusterInactive,
    /// Caller-supplied parameters failed validation.
    InvalidParameters,
    /// The stored credential could not be decrypted (fatal for the cluster).
    CredentialUnavailable,
    /// Network or timeout failure reaching the backend (caller-retryable).
    TransportError,
    /// The backend returned an error status (forwarded, not retried).
    BackendError,
    /// The caller's token did not resolve to an active actor.
    InvalidToken,
    /// An API description failed to parse during registry load.
    RegistryParseError,
}

impl ErrorKind {
    /// Returns the stable snake_case label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownOperation => "unknown_operation",
            Self::ClusterNotAssigned => "cluster_not_assigned",
            Self::OperationNotInRole => "operation_not_in_role",
            Self::EditModeRequired => "edit_mode_required",
            Self::ClusterNotFound => "cluster_not_found",
            Self::ClusterInactive => "cluster_inactive",
            Self::InvalidParameters => "invalid_parameters",
            Self::CredentialUnavailable => "credential_unavailable",
            Self::TransportError => "transport_error",
            Self::BackendError => "backend_error",
            Self::InvalidToken => "invalid_token",
            Self::RegistryParseError => "registry_parse_error",
        }
    }
}

// ============================================================================
// SECTION: Gateway Errors
// ============================================================================

/// Failure of one gateway operation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never contain credential material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The operation name did not resolve in the registry snapshot.
    #[error("unknown operation: {0}")]
    UnknownOperation(OperationName),
    /// Policy evaluation denied the dispatch.
    #[error("forbidden: {}", .0.as_str())]
    Forbidden(DenyReason),
    /// No cluster record matched the requested target.
    #[error("cluster not found: {0}")]
    ClusterNotFound(ClusterId),
    /// The cluster record is marked inactive.
    #[error("cluster inactive: {0}")]
    ClusterInactive(ClusterId),
    /// Caller-supplied parameters failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// The stored credential could not be decrypted for the cluster.
    #[error("cluster unavailable: credential cannot be decrypted for cluster {0}")]
    CredentialUnavailable(ClusterId),
    /// Network or timeout failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(String),
    /// The caller's token did not resolve to an active actor.
    #[error("invalid actor token")]
    InvalidToken,
    /// Directory storage failed while resolving call state.
    #[error("directory storage error: {0}")]
    Directory(String),
}

impl GatewayError {
    /// Returns the stable kind label for the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
            Self::Forbidden(reason) => match reason {
                DenyReason::UnknownOperation => ErrorKind::UnknownOperation,
                DenyReason::ClusterNotAssigned => ErrorKind::ClusterNotAssigned,
                DenyReason::OperationNotInRole => ErrorKind::OperationNotInRole,
                DenyReason::EditModeRequired => ErrorKind::EditModeRequired,
            },
            Self::ClusterNotFound(_) => ErrorKind::ClusterNotFound,
            Self::ClusterInactive(_) => ErrorKind::ClusterInactive,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::CredentialUnavailable(_) => ErrorKind::CredentialUnavailable,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::InvalidToken => ErrorKind::InvalidToken,
            Self::Directory(_) => ErrorKind::TransportError,
        }
    }
}
