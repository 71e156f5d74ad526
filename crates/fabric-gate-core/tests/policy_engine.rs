// crates/fabric-gate-core/tests/policy_engine.rs
// ============================================================================
// Module: Access Policy Engine Unit Tests
// Description: Ordered denial and allow-path coverage for authorize().
// Purpose: Validate check ordering, superuser handling, and edit-mode gating.
// ============================================================================

//! ## Overview
//! Unit tests for the access policy evaluation order:
//! - Unknown operations deny before any other check
//! - Cluster assignment denies before role membership
//! - Role membership denies before edit-mode gating
//! - The global switch gates write-shaped calls for everyone

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

use std::collections::BTreeSet;

use fabric_gate_core::Actor;
use fabric_gate_core::ActorId;
use fabric_gate_core::ApiFamily;
use fabric_gate_core::ClusterId;
use fabric_gate_core::Decision;
use fabric_gate_core::DenyReason;
use fabric_gate_core::GatewaySettings;
use fabric_gate_core::HttpMethod;
use fabric_gate_core::OperationDescriptor;
use fabric_gate_core::OperationName;
use fabric_gate_core::PathTemplate;
use fabric_gate_core::RoleId;
use fabric_gate_core::RoleRecord;
use fabric_gate_core::authorize;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn descriptor(name: &str, method: HttpMethod) -> OperationDescriptor {
    OperationDescriptor {
        name: OperationName::new(name),
        api_family: ApiFamily::Manage,
        http_method: method,
        path_template: PathTemplate::new("/vlans/{vlanId}"),
        requires_write_mode: method.is_write(),
        summary: String::new(),
        description: String::new(),
        query_parameters: Vec::new(),
        accepts_body: method.is_write(),
    }
}

fn role(name: &str, edit_mode: bool, operations: &[&str]) -> RoleRecord {
    RoleRecord {
        id: RoleId::from_raw(1).expect("nonzero role id"),
        name: name.to_string(),
        edit_mode_enabled: edit_mode,
        is_administrator: false,
        operations: operations.iter().map(|op| OperationName::new(*op)).collect(),
    }
}

fn actor(roles: Vec<RoleRecord>, clusters: &[i64], superuser: bool) -> Actor {
    Actor {
        id: ActorId::from_raw(7).expect("nonzero actor id"),
        username: "netops".to_string(),
        roles,
        assigned_clusters: clusters
            .iter()
            .map(|raw| ClusterId::from_raw(*raw).expect("nonzero cluster id"))
            .collect::<BTreeSet<ClusterId>>(),
        is_superuser: superuser,
    }
}

fn cluster(raw: i64) -> ClusterId {
    ClusterId::from_raw(raw).expect("nonzero cluster id")
}

fn edit_on() -> GatewaySettings {
    GatewaySettings {
        edit_mode_enabled: true,
    }
}

// ============================================================================
// SECTION: Ordering Tests
// ============================================================================

#[test]
fn unknown_operation_denies_first() {
    let caller = actor(vec![role("reader", false, &["manage_getVlan"])], &[1], false);
    let decision = authorize(&caller, None, cluster(1), edit_on());
    assert_eq!(decision, Decision::Deny(DenyReason::UnknownOperation));
}

#[test]
fn unassigned_cluster_denies_before_role_membership() {
    // The actor lacks both the cluster and the operation; cluster wins.
    let caller = actor(vec![role("reader", false, &[])], &[1], false);
    let op = descriptor("manage_getVlan", HttpMethod::Get);
    let decision = authorize(&caller, Some(&op), cluster(2), edit_on());
    assert_eq!(decision, Decision::Deny(DenyReason::ClusterNotAssigned));
}

#[test]
fn missing_role_membership_denies_before_edit_mode() {
    // A write op the actor holds no grant for must report the role gap,
    // not the edit-mode gap.
    let caller = actor(vec![role("reader", false, &["manage_getVlan"])], &[1], false);
    let op = descriptor("manage_createVlan", HttpMethod::Post);
    let decision = authorize(&caller, Some(&op), cluster(1), edit_on());
    assert_eq!(decision, Decision::Deny(DenyReason::OperationNotInRole));
}

#[test]
fn write_without_edit_role_denies_edit_mode() {
    let caller =
        actor(vec![role("operator", false, &["manage_createVlan"])], &[1], false);
    let op = descriptor("manage_createVlan", HttpMethod::Post);
    let decision = authorize(&caller, Some(&op), cluster(1), edit_on());
    assert_eq!(decision, Decision::Deny(DenyReason::EditModeRequired));
}

#[test]
fn global_switch_off_blocks_writes_for_everyone() {
    let caller =
        actor(vec![role("operator", true, &["manage_createVlan"])], &[1], true);
    let op = descriptor("manage_createVlan", HttpMethod::Post);
    let decision = authorize(&caller, Some(&op), cluster(1), GatewaySettings::default());
    assert_eq!(decision, Decision::Deny(DenyReason::EditModeRequired));
}

// ============================================================================
// SECTION: Allow-Path Tests
// ============================================================================

#[test]
fn read_operation_allows_without_edit_mode() {
    let caller = actor(vec![role("reader", false, &["manage_getVlan"])], &[1], false);
    let op = descriptor("manage_getVlan", HttpMethod::Get);
    let decision = authorize(&caller, Some(&op), cluster(1), GatewaySettings::default());
    assert_eq!(decision, Decision::Allow);
    assert!(decision.is_allowed());
}

#[test]
fn write_operation_allows_with_both_grants() {
    let caller =
        actor(vec![role("operator", true, &["manage_createVlan"])], &[1], false);
    let op = descriptor("manage_createVlan", HttpMethod::Post);
    let decision = authorize(&caller, Some(&op), cluster(1), edit_on());
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn administrator_role_permits_unlisted_operations() {
    let mut admin = role("administrator", true, &[]);
    admin.is_administrator = true;
    let caller = actor(vec![admin], &[1], false);
    let op = descriptor("manage_deleteVlan", HttpMethod::Delete);
    let decision = authorize(&caller, Some(&op), cluster(1), edit_on());
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn superuser_targets_any_cluster_with_empty_assignment() {
    let caller = actor(Vec::new(), &[], true);
    let op = descriptor("manage_getVlan", HttpMethod::Get);
    let decision = authorize(&caller, Some(&op), cluster(9), GatewaySettings::default());
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn empty_assignment_without_superuser_denies_every_cluster() {
    let caller = actor(vec![role("reader", false, &["manage_getVlan"])], &[], false);
    let op = descriptor("manage_getVlan", HttpMethod::Get);
    let decision = authorize(&caller, Some(&op), cluster(1), edit_on());
    assert_eq!(decision, Decision::Deny(DenyReason::ClusterNotAssigned));
}

#[test]
fn union_of_role_operations_is_considered() {
    let caller = actor(
        vec![
            role("vlan-reader", false, &["manage_getVlan"]),
            role("fabric-reader", false, &["manage_getFabric"]),
        ],
        &[1],
        false,
    );
    let op = descriptor("manage_getFabric", HttpMethod::Get);
    let decision = authorize(&caller, Some(&op), cluster(1), GatewaySettings::default());
    assert_eq!(decision, Decision::Allow);
}
