// crates/fabric-gate-core/src/lib.rs
// ============================================================================
// Module: Fabric Gate Core
// Description: Data model, access policy, and port interfaces for Fabric Gate.
// Purpose: Define the pure, I/O-free heart of the tool gateway.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Fabric Gate Core defines the canonical data model for operations, actors,
//! clusters, and audit entries, the ordered access policy evaluation, the
//! tool description enricher, and the storage-port traits the runtime crates
//! implement. Everything in this crate is deterministic and free of I/O so
//! the authorization and audit semantics are testable without a database or
//! network.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod enrich;
pub mod error;
pub mod interfaces;
pub mod policy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::audit::AuditEntry;
pub use crate::core::audit::AuditQuery;
pub use crate::core::audit::AuditStatistics;
pub use crate::core::audit::MAX_AUDIT_BODY_BYTES;
pub use crate::core::audit::redact_credentials;
pub use crate::core::audit::truncate_body;
pub use crate::core::directory::Actor;
pub use crate::core::directory::ClusterRecord;
pub use crate::core::directory::GatewaySettings;
pub use crate::core::directory::RoleRecord;
pub use crate::core::directory::SealedCredential;
pub use crate::core::identifiers::ActorId;
pub use crate::core::identifiers::ApiFamily;
pub use crate::core::identifiers::ClusterId;
pub use crate::core::identifiers::OperationName;
pub use crate::core::identifiers::RoleId;
pub use crate::core::operation::HttpMethod;
pub use crate::core::operation::OperationDescriptor;
pub use crate::core::operation::PathTemplate;
pub use enrich::GuidanceOverride;
pub use enrich::GuidanceSnapshot;
pub use enrich::describe;
pub use error::ErrorKind;
pub use error::GatewayError;
pub use interfaces::AuditStore;
pub use interfaces::AuditStoreError;
pub use interfaces::DirectoryError;
pub use interfaces::DirectoryStore;
pub use policy::Decision;
pub use policy::DenyReason;
pub use policy::authorize;
