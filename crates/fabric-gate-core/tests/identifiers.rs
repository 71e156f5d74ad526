// crates/fabric-gate-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier and Template Unit Tests
// Description: Operation naming, family parsing, and path template coverage.
// Purpose: Validate name derivation caps and placeholder substitution.
// ============================================================================

//! ## Overview
//! Unit tests for identifier construction invariants:
//! - Operation names prefer the prefixed form and cap at 64 bytes
//! - API family labels and base paths are stable
//! - Path templates extract and substitute placeholders in order

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

use std::collections::BTreeMap;

use fabric_gate_core::ApiFamily;
use fabric_gate_core::ClusterId;
use fabric_gate_core::OperationName;
use fabric_gate_core::PathTemplate;

// ============================================================================
// SECTION: Operation Name Tests
// ============================================================================

#[test]
fn short_names_take_the_prefixed_form() {
    let name = OperationName::from_parts(ApiFamily::Manage, "createVlan");
    assert_eq!(name.as_str(), "manage_createVlan");
}

#[test]
fn long_names_fall_back_to_the_bare_operation_id() {
    let long_id = "a".repeat(70);
    let name = OperationName::from_parts(ApiFamily::Analyze, &long_id);
    assert_eq!(name.as_str().len(), 64);
    assert!(!name.as_str().contains('_'));
}

#[test]
fn boundary_length_keeps_the_prefix() {
    // "manage_" is 7 bytes; a 57-byte id lands exactly on the cap.
    let id = "b".repeat(57);
    let name = OperationName::from_parts(ApiFamily::Manage, &id);
    assert_eq!(name.as_str().len(), 64);
    assert!(name.as_str().starts_with("manage_"));
}

// ============================================================================
// SECTION: API Family Tests
// ============================================================================

#[test]
fn family_labels_round_trip() {
    for family in [ApiFamily::Manage, ApiFamily::Analyze, ApiFamily::Infra, ApiFamily::OneManage] {
        assert_eq!(ApiFamily::parse(family.as_str()), Some(family));
    }
    assert_eq!(ApiFamily::parse("orchestrator"), None);
}

#[test]
fn base_paths_are_rooted_under_api_v1() {
    assert_eq!(ApiFamily::Manage.base_path(), "/api/v1/manage");
    assert_eq!(ApiFamily::OneManage.base_path(), "/api/v1/oneManage");
}

// ============================================================================
// SECTION: Numeric Identifier Tests
// ============================================================================

#[test]
fn zero_raw_ids_are_rejected() {
    assert!(ClusterId::from_raw(0).is_none());
    assert_eq!(ClusterId::from_raw(3).unwrap().get(), 3);
}

// ============================================================================
// SECTION: Path Template Tests
// ============================================================================

#[test]
fn placeholders_are_extracted_in_order() {
    let template = PathTemplate::new("/fabrics/{fabricName}/switches/{switchId}");
    assert_eq!(template.placeholders(), vec!["fabricName", "switchId"]);
}

#[test]
fn render_substitutes_all_placeholders() {
    let template = PathTemplate::new("/fabrics/{fabricName}/switches/{switchId}");
    let mut values = BTreeMap::new();
    values.insert("fabricName".to_string(), "dc1".to_string());
    values.insert("switchId".to_string(), "leaf-3".to_string());
    assert_eq!(template.render(&values).unwrap(), "/fabrics/dc1/switches/leaf-3");
}

#[test]
fn render_reports_the_first_missing_placeholder() {
    let template = PathTemplate::new("/fabrics/{fabricName}/switches/{switchId}");
    let mut values = BTreeMap::new();
    values.insert("switchId".to_string(), "leaf-3".to_string());
    assert_eq!(template.render(&values).unwrap_err(), "fabricName");
}

#[test]
fn templates_without_placeholders_render_verbatim() {
    let template = PathTemplate::new("/health");
    assert!(template.placeholders().is_empty());
    assert_eq!(template.render(&BTreeMap::new()).unwrap(), "/health");
}
