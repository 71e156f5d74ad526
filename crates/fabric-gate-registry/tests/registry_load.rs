// crates/fabric-gate-registry/tests/registry_load.rs
// ============================================================================
// Module: Registry Load Unit Tests
// Description: Parsing, uniqueness, and snapshot swap coverage.
// Purpose: Validate all-or-nothing loads and atomic replacement semantics.
// ============================================================================

//! ## Overview
//! Unit tests for registry construction:
//! - Structural validation names the offending source
//! - Duplicate operation names across sources fail the merged load while
//!   each source loads alone
//! - Write-mode classification follows the HTTP method
//! - Shared snapshot readers keep their generation across a reload

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

use std::thread;

use fabric_gate_core::ApiFamily;
use fabric_gate_core::HttpMethod;
use fabric_gate_core::OperationName;
use fabric_gate_registry::ApiDescription;
use fabric_gate_registry::RegistryLoadError;
use fabric_gate_registry::RegistrySnapshot;
use fabric_gate_registry::SharedRegistry;
use serde_json::json;
use serde_json::Value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn vlan_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {"title": "Fabric Controller", "version": "1.0.0"},
        "paths": {
            "/vlans/{vlanId}": {
                "get": {
                    "operationId": "getVlan",
                    "summary": "Fetch one VLAN",
                    "parameters": [
                        {"name": "vlanId", "in": "path", "required": true},
                        {"name": "expand", "in": "query"},
                    ],
                },
            },
            "/vlans": {
                "post": {
                    "operationId": "createVlan",
                    "summary": "Create a VLAN",
                    "requestBody": {"content": {}},
                },
            },
        },
    })
}

fn description(source: &str, family: ApiFamily, body: Value) -> ApiDescription {
    ApiDescription::new(source, family, body)
}

// ============================================================================
// SECTION: Load Tests
// ============================================================================

#[test]
fn load_builds_one_descriptor_per_method_path_pair() {
    let snapshot = RegistrySnapshot::load(&[description(
        "manage.json",
        ApiFamily::Manage,
        vlan_document(),
    )])
    .unwrap();
    assert_eq!(snapshot.len(), 2);

    let get_vlan = snapshot.lookup(&OperationName::new("manage_getVlan")).unwrap();
    assert_eq!(get_vlan.http_method, HttpMethod::Get);
    assert!(!get_vlan.requires_write_mode);
    assert_eq!(get_vlan.query_parameters, vec!["expand".to_string()]);
    assert!(!get_vlan.accepts_body);

    let create_vlan = snapshot.lookup(&OperationName::new("manage_createVlan")).unwrap();
    assert!(create_vlan.requires_write_mode);
    assert!(create_vlan.accepts_body);
}

#[test]
fn missing_sections_fail_with_the_source_named() {
    let result = RegistrySnapshot::load(&[description(
        "broken.json",
        ApiFamily::Infra,
        json!({"info": {"title": "x"}}),
    )]);
    match result {
        Err(RegistryLoadError::Parse { source, problems }) => {
            assert_eq!(source, "broken.json");
            assert!(problems.iter().any(|p| p.contains("openapi")));
            assert!(problems.iter().any(|p| p.contains("paths")));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn empty_paths_section_is_rejected() {
    let result = RegistrySnapshot::load(&[description(
        "empty.json",
        ApiFamily::Analyze,
        json!({"openapi": "3.0.0", "info": {"title": "x"}, "paths": {}}),
    )]);
    assert!(matches!(result, Err(RegistryLoadError::Parse { .. })));
}

#[test]
fn duplicate_names_across_sources_fail_the_merged_load() {
    let first = description("manage-a.json", ApiFamily::Manage, vlan_document());
    let second = description("manage-b.json", ApiFamily::Manage, vlan_document());

    // Each source loads alone.
    assert!(RegistrySnapshot::load(std::slice::from_ref(&first)).is_ok());
    assert!(RegistrySnapshot::load(std::slice::from_ref(&second)).is_ok());

    // The merged set collides and names both sources.
    match RegistrySnapshot::load(&[first, second]) {
        Err(RegistryLoadError::DuplicateOperation {
            name,
            first_source,
            second_source,
        }) => {
            assert_eq!(name.as_str(), "manage_createVlan");
            assert_eq!(first_source, "manage-a.json");
            assert_eq!(second_source, "manage-b.json");
        }
        other => panic!("expected duplicate error, got {other:?}"),
    }
}

#[test]
fn missing_operation_id_derives_a_name_from_method_and_path() {
    let snapshot = RegistrySnapshot::load(&[description(
        "infra.json",
        ApiFamily::Infra,
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Infra"},
            "paths": {"/health": {"get": {}}},
        }),
    )])
    .unwrap();
    assert!(snapshot.lookup(&OperationName::new("infra_get_/health")).is_some());
}

#[test]
fn sources_are_recorded_per_operation() {
    let snapshot = RegistrySnapshot::load(&[description(
        "manage.json",
        ApiFamily::Manage,
        vlan_document(),
    )])
    .unwrap();
    assert_eq!(
        snapshot.source_of(&OperationName::new("manage_getVlan")),
        Some("manage.json")
    );
}

// ============================================================================
// SECTION: Shared Snapshot Tests
// ============================================================================

#[test]
fn readers_keep_their_snapshot_across_a_reload() {
    let shared = SharedRegistry::new(
        RegistrySnapshot::load(&[description(
            "manage.json",
            ApiFamily::Manage,
            vlan_document(),
        )])
        .unwrap(),
    );

    let held = shared.snapshot();
    assert_eq!(held.len(), 2);

    shared.replace(RegistrySnapshot::default());

    // The held generation still resolves; new readers see the replacement.
    assert_eq!(held.len(), 2);
    assert_eq!(shared.snapshot().len(), 0);
}

#[test]
fn concurrent_readers_observe_complete_snapshots() {
    let shared = std::sync::Arc::new(SharedRegistry::new(RegistrySnapshot::default()));
    let loaded = RegistrySnapshot::load(&[description(
        "manage.json",
        ApiFamily::Manage,
        vlan_document(),
    )])
    .unwrap();

    let mut readers = Vec::new();
    for _ in 0..8 {
        let shared = std::sync::Arc::clone(&shared);
        readers.push(thread::spawn(move || {
            for _ in 0..1_000 {
                let snapshot = shared.snapshot();
                // Either generation is valid; a half-built set is not.
                assert!(snapshot.len() == 0 || snapshot.len() == 2);
            }
        }));
    }
    shared.replace(loaded);
    for reader in readers {
        reader.join().unwrap();
    }
}
