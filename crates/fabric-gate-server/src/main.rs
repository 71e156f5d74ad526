// crates/fabric-gate-server/src/main.rs
// ============================================================================
// Module: Fabric Gate Binary
// Description: Process entry point for the gateway server.
// Purpose: Load configuration, assemble the gateway, and serve requests.
// Dependencies: fabric-gate-server, clap, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! The binary parses its command line, initializes structured logging, loads
//! the TOML configuration, builds the registry from the description
//! directory, opens the store and the vault, and serves the RPC and admin
//! surfaces until the process is stopped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fabric_gate_core::MAX_AUDIT_BODY_BYTES;
use fabric_gate_dispatch::DispatchConfig;
use fabric_gate_registry::RegistrySnapshot;
use fabric_gate_server::GatewayConfig;
use fabric_gate_server::GatewayState;
use fabric_gate_server::load_descriptions;
use fabric_gate_server::serve;
use fabric_gate_store_sqlite::SqliteGatewayStore;
use fabric_gate_vault::CredentialKey;
use fabric_gate_vault::Vault;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Tool gateway for multi-cluster network fabric management APIs.
#[derive(Debug, Parser)]
#[command(name = "fabric-gate", version)]
struct Cli {
    /// Path to the gateway configuration file.
    #[arg(long, default_value = "fabric_gate.toml")]
    config: PathBuf,
}

// ============================================================================
// SECTION: Startup Errors
// ============================================================================

/// Fatal startup failures.
#[derive(Debug, Error)]
enum StartupError {
    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(String),
    /// The vault master key is unusable.
    #[error("vault key error: master key must be 32 bytes of base64")]
    VaultKey,
    /// The registry could not be built at startup.
    #[error("registry error: {0}")]
    Registry(String),
    /// The store could not be opened.
    #[error("store error: {0}")]
    Store(String),
    /// The server failed.
    #[error("server error: {0}")]
    Server(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Gateway entry point: load configuration, assemble components, serve.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let config = GatewayConfig::load(&cli.config)
        .map_err(|err| StartupError::Config(err.to_string()))?;

    let key_base64 =
        config.master_key_base64().map_err(|err| StartupError::Config(err.to_string()))?;
    let key = CredentialKey::from_base64(&key_base64).ok_or(StartupError::VaultKey)?;
    let vault = Vault::new(key);

    let descriptions = load_descriptions(&config.registry.descriptions_dir)
        .map_err(|err| StartupError::Registry(err.to_string()))?;
    let registry = RegistrySnapshot::load(&descriptions)
        .map_err(|err| StartupError::Registry(err.to_string()))?;
    tracing::info!(operations = registry.len(), "registry loaded");

    let store = Arc::new(
        SqliteGatewayStore::open(&config.database)
            .map_err(|err| StartupError::Store(err.to_string()))?,
    );

    let state = Arc::new(GatewayState::new(
        registry,
        store,
        vault,
        DispatchConfig {
            timeout_ms: config.dispatch.timeout_ms,
            audit_body_cap: MAX_AUDIT_BODY_BYTES,
            ..DispatchConfig::default()
        },
        config.registry.descriptions_dir.clone(),
        config.registry.guidance_path.clone(),
        config.server.max_body_bytes,
    ));

    serve(state, &config.server.bind)
        .await
        .map_err(|err| StartupError::Server(err.to_string()))
}
