// crates/fabric-gate-core/src/core/audit.rs
// ============================================================================
// Module: Audit Entries
// Description: Append-only audit record model with redaction and truncation.
// Purpose: Capture every dispatch attempt in a stable export schema.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Exactly one [`AuditEntry`] is produced per dispatch attempt, after the
//! attempt resolves, on every exit path including policy denials. The field
//! set is a compatibility contract for downstream log shippers. Request
//! bodies are redacted of credential-bearing keys before they reach the
//! entry; response bodies larger than [`MAX_AUDIT_BODY_BYTES`] are replaced
//! by a truncation marker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

use crate::core::identifiers::ActorId;
use crate::core::identifiers::ClusterId;
use crate::core::identifiers::OperationName;
use crate::core::operation::HttpMethod;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum serialized size of a response body persisted in an audit entry.
pub const MAX_AUDIT_BODY_BYTES: usize = 64 * 1024;

/// Lowercase key substrings whose values are redacted from request bodies.
const REDACTED_KEY_MARKERS: &[&str] = &["password", "secret", "token", "credential", "authorization"];

/// Replacement value for redacted fields.
const REDACTION_PLACEHOLDER: &str = "[REDACTED]";

// ============================================================================
// SECTION: Audit Entry
// ============================================================================

/// One appended audit record for a dispatch attempt.
///
/// # Invariants
/// - `request_body` has credential-bearing keys redacted.
/// - `response_body` is no larger than [`MAX_AUDIT_BODY_BYTES`] serialized.
/// - `cluster_id` is `None` only when the attempt failed before a cluster
///   record was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Target cluster, when resolved.
    pub cluster_id: Option<ClusterId>,
    /// Calling actor.
    pub actor_id: ActorId,
    /// Calling actor's login name.
    pub actor_name: String,
    /// Operation name attempted.
    pub operation_name: OperationName,
    /// HTTP method of the operation; `None` when the name never resolved.
    pub http_method: Option<HttpMethod>,
    /// Backend path (rendered when substitution succeeded, template otherwise).
    pub path: String,
    /// Redacted request body, when one was supplied.
    pub request_body: Option<Value>,
    /// Backend response status, when a response was received.
    pub response_status: Option<u16>,
    /// Truncation-capped response body, when a response was received.
    pub response_body: Option<Value>,
    /// Error message for denied or failed attempts.
    pub error_message: Option<String>,
    /// Originating client IP, when known.
    pub client_ip: Option<String>,
    /// Wall-clock time the attempt resolved.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

// ============================================================================
// SECTION: Audit Query
// ============================================================================

/// Filters and pagination for reading the audit trail.
///
/// # Invariants
/// - Results are ordered by timestamp descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Restrict to one cluster.
    pub cluster_id: Option<ClusterId>,
    /// Restrict to one actor.
    pub actor_id: Option<ActorId>,
    /// Restrict to one operation name.
    pub operation_name: Option<OperationName>,
    /// Restrict to one HTTP method.
    pub http_method: Option<HttpMethod>,
    /// Lower timestamp bound (inclusive).
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub since: Option<OffsetDateTime>,
    /// Upper timestamp bound (inclusive).
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub until: Option<OffsetDateTime>,
    /// Restrict to entries carrying an error message.
    pub errors_only: bool,
    /// Maximum entries to return (0 means the store default).
    pub limit: usize,
    /// Entries to skip before returning results.
    pub offset: usize,
}

/// Aggregate counters over the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStatistics {
    /// Total recorded attempts.
    pub total: u64,
    /// Attempts per HTTP method label.
    pub by_method: Vec<(String, u64)>,
    /// Attempts with a 2xx response status.
    pub successes: u64,
    /// Attempts carrying an error message.
    pub errors: u64,
}

// ============================================================================
// SECTION: Redaction Helpers
// ============================================================================

/// Recursively redacts credential-bearing keys from a JSON value.
///
/// A key is redacted when its lowercase form contains any of the sensitive
/// markers (password, secret, token, credential, authorization).
#[must_use]
pub fn redact_credentials(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| {
                    let lowered = key.to_ascii_lowercase();
                    if REDACTED_KEY_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                        (key, Value::String(REDACTION_PLACEHOLDER.to_string()))
                    } else {
                        (key, redact_credentials(inner))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_credentials).collect()),
        other => other,
    }
}

/// Replaces a JSON value with a truncation marker when it serializes beyond
/// the byte cap.
#[must_use]
pub fn truncate_body(value: Value, max_bytes: usize) -> Value {
    let serialized_len = serde_json::to_vec(&value).map_or(0, |bytes| bytes.len());
    if serialized_len <= max_bytes {
        value
    } else {
        json!({
            "truncated": true,
            "original_bytes": serialized_len,
        })
    }
}
