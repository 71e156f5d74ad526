// crates/fabric-gate-registry/src/lib.rs
// ============================================================================
// Module: Fabric Gate Registry
// Description: Operation registry built from backend API descriptions.
// Purpose: Parse API descriptions into immutable, atomically swapped snapshots.
// Dependencies: fabric-gate-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The registry turns machine-readable API descriptions into a canonical,
//! queryable set of [`fabric_gate_core::OperationDescriptor`] records.
//! Loading is pure: a set of descriptions either produces a complete
//! [`RegistrySnapshot`] or fails with the offending source named. Reload
//! replaces the shared snapshot atomically; in-flight calls keep reading the
//! snapshot they started with.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod description;
pub mod shared;
pub mod snapshot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use description::ApiDescription;
pub use description::document_info;
pub use shared::SharedGuidance;
pub use shared::SharedRegistry;
pub use shared::SharedSnapshot;
pub use snapshot::RegistryLoadError;
pub use snapshot::RegistrySnapshot;
