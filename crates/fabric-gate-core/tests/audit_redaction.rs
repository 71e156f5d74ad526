// crates/fabric-gate-core/tests/audit_redaction.rs
// ============================================================================
// Module: Audit Redaction Unit Tests
// Description: Redaction and truncation coverage for audit bodies.
// Purpose: Validate that credential fields never reach persisted entries.
// ============================================================================

//! ## Overview
//! Unit tests for audit body hygiene:
//! - Credential-bearing keys are redacted at every nesting depth
//! - Non-sensitive values pass through untouched
//! - Oversized response bodies collapse into a truncation marker

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use fabric_gate_core::MAX_AUDIT_BODY_BYTES;
use fabric_gate_core::redact_credentials;
use fabric_gate_core::truncate_body;
use serde_json::json;

// ============================================================================
// SECTION: Redaction Tests
// ============================================================================

#[test]
fn top_level_password_is_redacted() {
    let redacted = redact_credentials(json!({"username": "admin", "password": "hunter2"}));
    assert_eq!(redacted, json!({"username": "admin", "password": "[REDACTED]"}));
}

#[test]
fn nested_and_mixed_case_keys_are_redacted() {
    let body = json!({
        "payload": {
            "authToken": "abc",
            "items": [{"clientSecret": "xyz", "vlanId": 42}],
        },
        "Authorization": "Basic ...",
    });
    let redacted = redact_credentials(body);
    assert_eq!(
        redacted,
        json!({
            "payload": {
                "authToken": "[REDACTED]",
                "items": [{"clientSecret": "[REDACTED]", "vlanId": 42}],
            },
            "Authorization": "[REDACTED]",
        })
    );
}

#[test]
fn non_sensitive_payloads_pass_through() {
    let body = json!({"fabricName": "dc1", "vlans": [10, 20, 30]});
    assert_eq!(redact_credentials(body.clone()), body);
}

#[test]
fn scalar_values_are_untouched() {
    assert_eq!(redact_credentials(json!("password")), json!("password"));
    assert_eq!(redact_credentials(json!(42)), json!(42));
}

// ============================================================================
// SECTION: Truncation Tests
// ============================================================================

#[test]
fn small_bodies_survive_truncation() {
    let body = json!({"status": "ok"});
    assert_eq!(truncate_body(body.clone(), MAX_AUDIT_BODY_BYTES), body);
}

#[test]
fn oversized_bodies_collapse_into_a_marker() {
    let big = json!({"data": "x".repeat(MAX_AUDIT_BODY_BYTES)});
    let truncated = truncate_body(big, MAX_AUDIT_BODY_BYTES);
    assert_eq!(truncated["truncated"], json!(true));
    let original = truncated["original_bytes"].as_u64().unwrap();
    assert!(original as usize > MAX_AUDIT_BODY_BYTES);
}

#[test]
fn cap_boundary_is_inclusive() {
    let body = json!("abc");
    let exact = serde_json::to_vec(&body).unwrap().len();
    assert_eq!(truncate_body(body.clone(), exact), body);
    let truncated = truncate_body(body, exact - 1);
    assert_eq!(truncated["truncated"], json!(true));
}
