// crates/fabric-gate-server/src/state.rs
// ============================================================================
// Module: Gateway State
// Description: Assembled gateway components shared by all request handlers.
// Purpose: Wire registry, guidance, store, vault, and dispatcher together.
// Dependencies: fabric-gate-core, fabric-gate-dispatch, fabric-gate-registry
// ============================================================================

//! ## Overview
//! [`GatewayState`] owns the long-lived components: the shared registry and
//! guidance snapshots, the SQLite store behind both storage ports, the vault,
//! and the dispatcher built over them. Handlers clone the `Arc`-wrapped state
//! and read snapshots per request; registry reload swaps snapshots without
//! touching in-flight calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use fabric_gate_core::Actor;
use fabric_gate_core::AuditStore;
use fabric_gate_core::DirectoryStore;
use fabric_gate_core::GatewayError;
use fabric_gate_dispatch::AuditRecorder;
use fabric_gate_dispatch::DispatchConfig;
use fabric_gate_dispatch::Dispatcher;
use fabric_gate_registry::RegistryLoadError;
use fabric_gate_registry::RegistrySnapshot;
use fabric_gate_registry::SharedGuidance;
use fabric_gate_registry::SharedRegistry;
use fabric_gate_store_sqlite::SqliteGatewayStore;
use fabric_gate_vault::Vault;

use crate::loader::LoadError;
use crate::loader::load_descriptions;
use crate::loader::load_guidance;

// ============================================================================
// SECTION: Reload Errors
// ============================================================================

/// Registry reload failures surfaced to the admin caller.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// Description files could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The merged description set failed registry validation.
    #[error(transparent)]
    Registry(#[from] RegistryLoadError),
}

// ============================================================================
// SECTION: Gateway State
// ============================================================================

/// Long-lived gateway components shared across request handlers.
pub struct GatewayState {
    /// Shared operation registry snapshot.
    pub registry: Arc<SharedRegistry>,
    /// Shared guidance override snapshot.
    pub guidance: Arc<SharedGuidance>,
    /// SQLite store, serving both storage ports.
    pub store: Arc<SqliteGatewayStore>,
    /// Tool-call dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Directory of API description files for reloads.
    pub descriptions_dir: PathBuf,
    /// Optional guidance file for reloads.
    pub guidance_path: Option<PathBuf>,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl GatewayState {
    /// Assembles the gateway over an opened store and vault.
    #[must_use]
    pub fn new(
        initial_registry: RegistrySnapshot,
        store: Arc<SqliteGatewayStore>,
        vault: Vault,
        dispatch_config: DispatchConfig,
        descriptions_dir: PathBuf,
        guidance_path: Option<PathBuf>,
        max_body_bytes: usize,
    ) -> Self {
        let registry = Arc::new(SharedRegistry::new(initial_registry));
        let guidance = Arc::new(SharedGuidance::new(load_guidance(guidance_path.as_deref())));
        let recorder =
            AuditRecorder::new(Arc::clone(&store) as Arc<dyn AuditStore>);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn DirectoryStore>,
            Arc::new(vault),
            recorder,
            dispatch_config,
        ));
        Self {
            registry,
            guidance,
            store,
            dispatcher,
            descriptions_dir,
            guidance_path,
            max_body_bytes,
        }
    }

    /// Resolves a bearer token to an actor through the directory store.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidToken`] for unknown or inactive tokens
    /// and [`GatewayError::Directory`] when the lookup itself fails.
    pub fn authenticate(&self, token: &str) -> Result<Actor, GatewayError> {
        self.store
            .resolve_token(token)
            .map_err(|err| GatewayError::Directory(err.to_string()))?
            .ok_or(GatewayError::InvalidToken)
    }

    /// Rebuilds the registry and guidance snapshots from their sources.
    ///
    /// In-flight calls keep the snapshot they started with; the swap is
    /// atomic and all-or-nothing, so a failed reload leaves the previous
    /// generation active.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError`] when the sources are unreadable or the merged
    /// set fails validation.
    pub fn reload_registry(&self) -> Result<usize, ReloadError> {
        let descriptions = load_descriptions(&self.descriptions_dir)?;
        let snapshot = RegistrySnapshot::load(&descriptions)?;
        let loaded = snapshot.len();
        self.registry.replace(snapshot);
        self.guidance.replace(load_guidance(self.guidance_path.as_deref()));
        tracing::info!(operations = loaded, "registry reloaded");
        Ok(loaded)
    }
}
