// crates/fabric-gate-dispatch/tests/dispatch_concurrency.rs
// ============================================================================
// Module: Dispatch Concurrency Tests
// Description: Parallel dispatch audit-fidelity coverage.
// Purpose: Validate exactly-one audit entry per attempt under load.
// Dependencies: fabric-gate-dispatch
// ============================================================================

//! ## Overview
//! Runs one thousand dispatches across ten clusters from twenty threads with
//! mixed allow/deny outcomes and asserts the audit trail holds exactly one
//! entry per attempt, with no duplicates or omissions. Allowed calls target
//! unreachable backends, so they resolve as transport errors without needing
//! a live server; denied calls never leave the policy engine.

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

mod common;

use std::sync::Arc;
use std::thread;

use fabric_gate_core::AuditStore;
use fabric_gate_core::ClusterId;
use fabric_gate_core::GatewayError;
use fabric_gate_core::OperationName;
use fabric_gate_dispatch::AuditRecorder;
use fabric_gate_dispatch::DispatchConfig;
use fabric_gate_dispatch::DispatchRequest;
use fabric_gate_dispatch::Dispatcher;
use serde_json::Map;
use serde_json::json;

use crate::common::FakeDirectory;
use crate::common::RecordingAuditStore;
use crate::common::actor;
use crate::common::cluster;
use crate::common::role;
use crate::common::test_vault;
use crate::common::vlan_registry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Worker threads issuing dispatches.
const THREADS: usize = 20;

/// Dispatches issued per worker.
const CALLS_PER_THREAD: usize = 50;

/// Clusters targeted round-robin; the first half is assigned to the actor.
const CLUSTERS: i64 = 10;

// ============================================================================
// SECTION: Concurrency Test
// ============================================================================

#[test]
fn one_thousand_parallel_dispatches_audit_exactly_once_each() {
    let vault = test_vault();
    let mut directory = FakeDirectory::new();
    for raw in 1..=CLUSTERS {
        directory = directory.with_cluster(cluster(raw, "http://127.0.0.1:1", &vault));
    }

    let audit = Arc::new(RecordingAuditStore::new());
    let dispatcher = Arc::new(Dispatcher::new(
        vlan_registry(),
        Arc::new(directory),
        Arc::new(test_vault()),
        AuditRecorder::new(Arc::clone(&audit) as Arc<dyn AuditStore>),
        DispatchConfig {
            timeout_ms: 500,
            ..DispatchConfig::default()
        },
    ));

    let caller = actor(vec![role(false, &["manage_getVlan"])], &[1, 2, 3, 4, 5], false);
    let mut workers = Vec::new();
    for worker in 0..THREADS {
        let dispatcher = Arc::clone(&dispatcher);
        let caller = caller.clone();
        workers.push(thread::spawn(move || {
            let mut denied = 0_usize;
            let mut attempted = 0_usize;
            for call in 0..CALLS_PER_THREAD {
                let raw = ((worker * CALLS_PER_THREAD + call) % CLUSTERS as usize) as i64 + 1;
                let mut arguments = Map::new();
                arguments.insert("vlanId".to_string(), json!(call));
                let request = DispatchRequest {
                    actor: caller.clone(),
                    operation_name: OperationName::new("manage_getVlan"),
                    cluster_id: ClusterId::from_raw(raw).unwrap(),
                    arguments,
                    client_ip: None,
                };
                match dispatcher.dispatch(&request) {
                    Err(GatewayError::Forbidden(_)) => denied += 1,
                    Err(GatewayError::Transport(_)) => attempted += 1,
                    other => panic!("unexpected outcome: {other:?}"),
                }
            }
            (denied, attempted)
        }));
    }

    let mut denied = 0_usize;
    let mut attempted = 0_usize;
    for worker in workers {
        let (worker_denied, worker_attempted) = worker.join().unwrap();
        denied += worker_denied;
        attempted += worker_attempted;
    }

    let total = THREADS * CALLS_PER_THREAD;
    assert_eq!(denied + attempted, total);
    // Half the clusters are outside the assigned set.
    assert_eq!(denied, total / 2);

    let entries = audit.recorded();
    assert_eq!(entries.len(), total);
    assert!(entries.iter().all(|entry| entry.operation_name.as_str() == "manage_getVlan"));
    let denied_entries = entries
        .iter()
        .filter(|entry| entry.error_message.as_deref() == Some("ClusterNotAssigned"))
        .count();
    assert_eq!(denied_entries, denied);
}
