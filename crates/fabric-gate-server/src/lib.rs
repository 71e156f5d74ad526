// crates/fabric-gate-server/src/lib.rs
// ============================================================================
// Module: Fabric Gate Server
// Description: JSON-RPC tool surface and admin routes over the gateway core.
// Purpose: Expose registry operations as callable tools with auth and audit.
// Dependencies: fabric-gate-core, fabric-gate-dispatch, axum, tokio
// ============================================================================

//! ## Overview
//! The server wires the gateway together: it loads API descriptions and
//! guidance into shared snapshots, opens the SQLite store and the vault, and
//! exposes the tool surface over JSON-RPC 2.0 (`tools/list`, `tools/call`)
//! plus admin routes for registry reload and audit export. Callers
//! authenticate with bearer tokens resolved through the directory store.
//! Tool calls execute on blocking threads, so a disconnecting client cannot
//! cancel an in-flight backend call or its audit entry.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod loader;
pub mod server;
pub mod state;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::GatewayConfig;
pub use loader::load_descriptions;
pub use loader::load_guidance;
pub use server::serve;
pub use state::GatewayState;
pub use tools::ToolDefinition;
