// crates/fabric-gate-dispatch/src/lib.rs
// ============================================================================
// Module: Fabric Gate Dispatch
// Description: Authorized backend dispatch with guaranteed audit recording.
// Purpose: Execute one tool call against one cluster, auditing every outcome.
// Dependencies: fabric-gate-core, fabric-gate-registry, fabric-gate-vault, reqwest
// ============================================================================

//! ## Overview
//! The dispatcher is the component every tool call flows through. It resolves
//! the operation from the registry snapshot, asks the access policy engine
//! for a decision, opens a scoped credential access against the vault,
//! performs the backend HTTP call under the cluster's TLS policy and a
//! bounded timeout, and maps the outcome into the gateway taxonomy. Every
//! exit path, including early denials, funnels through a single audit point
//! before returning, so exactly one audit entry exists per dispatch attempt.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod dispatcher;
pub mod recorder;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dispatcher::DispatchConfig;
pub use dispatcher::DispatchOutcome;
pub use dispatcher::DispatchRequest;
pub use dispatcher::DispatchResult;
pub use dispatcher::Dispatcher;
pub use recorder::AuditRecorder;
