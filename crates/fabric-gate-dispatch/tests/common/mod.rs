// crates/fabric-gate-dispatch/tests/common/mod.rs
// ============================================================================
// Module: Dispatch Test Fixtures
// Description: In-memory directory and audit fakes plus registry builders.
// Purpose: Exercise the dispatcher without a database or live backend.
// ============================================================================

//! ## Overview
//! Shared fixtures for dispatcher tests: an in-memory directory store, an
//! audit store that counts and retains entries, and builders for actors,
//! clusters, and a small VLAN-shaped registry.

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
    dead_code,
    reason = "Test-only fixtures; not every test uses every helper."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use fabric_gate_core::Actor;
use fabric_gate_core::ActorId;
use fabric_gate_core::ApiFamily;
use fabric_gate_core::AuditEntry;
use fabric_gate_core::AuditQuery;
use fabric_gate_core::AuditStatistics;
use fabric_gate_core::AuditStore;
use fabric_gate_core::AuditStoreError;
use fabric_gate_core::ClusterId;
use fabric_gate_core::ClusterRecord;
use fabric_gate_core::DirectoryError;
use fabric_gate_core::DirectoryStore;
use fabric_gate_core::GatewaySettings;
use fabric_gate_core::OperationName;
use fabric_gate_core::RoleId;
use fabric_gate_core::RoleRecord;
use fabric_gate_core::SealedCredential;
use fabric_gate_registry::ApiDescription;
use fabric_gate_registry::RegistrySnapshot;
use fabric_gate_registry::SharedRegistry;
use fabric_gate_vault::CredentialKey;
use fabric_gate_vault::Vault;
use serde_json::json;

// ============================================================================
// SECTION: Directory Fake
// ============================================================================

/// In-memory directory store for dispatcher tests.
pub struct FakeDirectory {
    /// Cluster records keyed by raw identifier.
    pub clusters: BTreeMap<i64, ClusterRecord>,
    /// Global switches returned by `settings`.
    pub settings: GatewaySettings,
}

impl FakeDirectory {
    /// Creates an empty directory with edit mode enabled.
    pub fn new() -> Self {
        Self {
            clusters: BTreeMap::new(),
            settings: GatewaySettings {
                edit_mode_enabled: true,
            },
        }
    }

    /// Adds a cluster record.
    pub fn with_cluster(mut self, cluster: ClusterRecord) -> Self {
        self.clusters.insert(cluster.id.get(), cluster);
        self
    }

    /// Sets the global edit-mode switch.
    pub fn with_edit_mode(mut self, enabled: bool) -> Self {
        self.settings.edit_mode_enabled = enabled;
        self
    }
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryStore for FakeDirectory {
    fn resolve_token(&self, _token: &str) -> Result<Option<Actor>, DirectoryError> {
        Ok(None)
    }

    fn cluster(&self, id: ClusterId) -> Result<Option<ClusterRecord>, DirectoryError> {
        Ok(self.clusters.get(&id.get()).cloned())
    }

    fn cluster_by_name(&self, name: &str) -> Result<Option<ClusterRecord>, DirectoryError> {
        Ok(self.clusters.values().find(|cluster| cluster.name == name).cloned())
    }

    fn clusters(&self, active_only: bool) -> Result<Vec<ClusterRecord>, DirectoryError> {
        Ok(self
            .clusters
            .values()
            .filter(|cluster| !active_only || cluster.is_active)
            .cloned()
            .collect())
    }

    fn settings(&self) -> Result<GatewaySettings, DirectoryError> {
        Ok(self.settings)
    }
}

// ============================================================================
// SECTION: Audit Fake
// ============================================================================

/// Audit store that retains every appended entry in memory.
#[derive(Default)]
pub struct RecordingAuditStore {
    /// Entries in append order.
    pub entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingAuditStore {
    /// Creates an empty recording store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded entries.
    pub fn recorded(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Returns the number of recorded entries.
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl AuditStore for RecordingAuditStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError> {
        let mut entries = self.recorded();
        entries.retain(|entry| {
            query.cluster_id.is_none_or(|id| entry.cluster_id == Some(id))
                && query.actor_id.is_none_or(|id| entry.actor_id == id)
        });
        entries.reverse();
        Ok(entries)
    }

    fn statistics(&self) -> Result<AuditStatistics, AuditStoreError> {
        let entries = self.recorded();
        Ok(AuditStatistics {
            total: entries.len() as u64,
            by_method: Vec::new(),
            successes: entries
                .iter()
                .filter(|entry| entry.response_status.is_some_and(|s| (200..300).contains(&s)))
                .count() as u64,
            errors: entries.iter().filter(|entry| entry.error_message.is_some()).count() as u64,
        })
    }
}

/// Audit store whose writes always fail, for durability-contract tests.
pub struct FailingAuditStore;

impl AuditStore for FailingAuditStore {
    fn append(&self, _entry: &AuditEntry) -> Result<(), AuditStoreError> {
        Err(AuditStoreError::Io("disk unavailable".to_string()))
    }

    fn query(&self, _query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError> {
        Err(AuditStoreError::Io("disk unavailable".to_string()))
    }

    fn statistics(&self) -> Result<AuditStatistics, AuditStoreError> {
        Err(AuditStoreError::Io("disk unavailable".to_string()))
    }
}

// ============================================================================
// SECTION: Record Builders
// ============================================================================

/// Builds the shared test vault.
pub fn test_vault() -> Vault {
    Vault::new(CredentialKey::from_bytes([42_u8; 32]))
}

/// Builds an active cluster pointing at `base_url` with a sealed credential.
pub fn cluster(raw_id: i64, base_url: &str, vault: &Vault) -> ClusterRecord {
    ClusterRecord {
        id: ClusterId::from_raw(raw_id).unwrap(),
        name: format!("cluster-{raw_id}"),
        base_url: base_url.to_string(),
        username: "admin".to_string(),
        credential: vault.encrypt("s3cret").unwrap(),
        verify_ssl: false,
        is_active: true,
    }
}

/// Builds a cluster whose stored credential is unreadable garbage.
pub fn cluster_with_garbage_credential(raw_id: i64, base_url: &str) -> ClusterRecord {
    ClusterRecord {
        id: ClusterId::from_raw(raw_id).unwrap(),
        name: format!("cluster-{raw_id}"),
        base_url: base_url.to_string(),
        username: "admin".to_string(),
        credential: SealedCredential::new("garbage"),
        verify_ssl: false,
        is_active: true,
    }
}

/// Builds a role permitting the given operations.
pub fn role(edit_mode: bool, operations: &[&str]) -> RoleRecord {
    RoleRecord {
        id: RoleId::from_raw(1).unwrap(),
        name: "netops".to_string(),
        edit_mode_enabled: edit_mode,
        is_administrator: false,
        operations: operations.iter().map(|op| OperationName::new(*op)).collect(),
    }
}

/// Builds an actor holding `roles` and assigned to `clusters`.
pub fn actor(roles: Vec<RoleRecord>, clusters: &[i64], superuser: bool) -> Actor {
    Actor {
        id: ActorId::from_raw(7).unwrap(),
        username: "netops".to_string(),
        roles,
        assigned_clusters: clusters
            .iter()
            .map(|raw| ClusterId::from_raw(*raw).unwrap())
            .collect::<BTreeSet<ClusterId>>(),
        is_superuser: superuser,
    }
}

// ============================================================================
// SECTION: Registry Builders
// ============================================================================

/// Builds a shared registry with VLAN read/create operations.
pub fn vlan_registry() -> Arc<SharedRegistry> {
    let snapshot = RegistrySnapshot::load(&[ApiDescription::new(
        "manage.json",
        ApiFamily::Manage,
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Fabric Controller", "version": "1.0.0"},
            "paths": {
                "/vlans/{vlanId}": {
                    "get": {
                        "operationId": "getVlan",
                        "summary": "Fetch one VLAN",
                        "parameters": [{"name": "expand", "in": "query"}],
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
        }),
    )])
    .unwrap();
    Arc::new(SharedRegistry::new(snapshot))
}
