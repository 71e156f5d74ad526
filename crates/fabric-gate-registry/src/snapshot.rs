// crates/fabric-gate-registry/src/snapshot.rs
// ============================================================================
// Module: Registry Snapshots
// Description: Immutable merged operation sets with uniqueness enforcement.
// Purpose: Build and query the canonical operation registry.
// Dependencies: fabric-gate-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`RegistrySnapshot`] is the merged, validated operation set from one
//! load. Building is all-or-nothing: any structural problem or operation
//! name collision fails the load with the offending sources named, and the
//! previously active snapshot stays in place. Lookups are cheap map reads;
//! snapshots are never mutated after construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use fabric_gate_core::OperationDescriptor;
use fabric_gate_core::OperationName;
use fabric_gate_core::PathTemplate;

use crate::description::ApiDescription;
use crate::description::operations_of;
use crate::description::query_parameter_names;

// ============================================================================
// SECTION: Load Errors
// ============================================================================

/// Errors produced while building a registry snapshot.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `source` fields carry the description's origin label verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLoadError {
    /// A description document failed structural validation.
    Parse {
        /// Origin label of the offending description.
        source: String,
        /// Structural problems found in the document.
        problems: Vec<String>,
    },
    /// Two descriptions produced the same operation name.
    DuplicateOperation {
        /// Colliding operation name.
        name: OperationName,
        /// Source that defined the name first.
        first_source: String,
        /// Source that defined the name again.
        second_source: String,
    },
}

impl std::fmt::Display for RegistryLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { source, problems } => {
                write!(
                    f,
                    "invalid api description '{source}': {}",
                    problems.join("; ")
                )
            }
            Self::DuplicateOperation {
                name,
                first_source,
                second_source,
            } => write!(
                f,
                "duplicate operation '{name}' defined by '{first_source}' and '{second_source}'"
            ),
        }
    }
}

impl std::error::Error for RegistryLoadError {}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Immutable, queryable operation registry built from one load.
///
/// # Invariants
/// - Operation names are unique across the merged set.
/// - Never mutated after construction; reload builds a fresh snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// Descriptors keyed by canonical operation name.
    operations: BTreeMap<OperationName, OperationDescriptor>,
    /// Origin label per operation, kept for collision reporting on reload.
    sources: BTreeMap<OperationName, String>,
}

impl RegistrySnapshot {
    /// Builds a snapshot from the supplied API descriptions.
    ///
    /// One descriptor is created per distinct (method, path) pair across all
    /// descriptions. Operation names must be unique across the merged set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryLoadError::Parse`] when a document fails structural
    /// validation and [`RegistryLoadError::DuplicateOperation`] naming both
    /// sources on a name collision.
    pub fn load(descriptions: &[ApiDescription]) -> Result<Self, RegistryLoadError> {
        let mut operations = BTreeMap::new();
        let mut sources: BTreeMap<OperationName, String> = BTreeMap::new();
        for description in descriptions {
            let problems = description.validate();
            if !problems.is_empty() {
                return Err(RegistryLoadError::Parse {
                    source: description.source.clone(),
                    problems,
                });
            }
            for (path, method, raw) in operations_of(&description.body) {
                let operation_id = raw.operation_id.clone().unwrap_or_else(|| {
                    format!("{}_{path}", method.as_str().to_ascii_lowercase())
                });
                let name = OperationName::from_parts(description.family, &operation_id);
                if let Some(first_source) = sources.get(&name) {
                    return Err(RegistryLoadError::DuplicateOperation {
                        name,
                        first_source: first_source.clone(),
                        second_source: description.source.clone(),
                    });
                }
                let descriptor = OperationDescriptor {
                    name: name.clone(),
                    api_family: description.family,
                    http_method: method,
                    path_template: PathTemplate::new(&path),
                    requires_write_mode: method.is_write(),
                    summary: raw.summary.clone(),
                    description: if raw.description.is_empty() {
                        raw.summary.clone()
                    } else {
                        raw.description.clone()
                    },
                    query_parameters: query_parameter_names(&raw),
                    accepts_body: raw.request_body.is_some(),
                };
                sources.insert(name.clone(), description.source.clone());
                operations.insert(name, descriptor);
            }
        }
        Ok(Self {
            operations,
            sources,
        })
    }

    /// Looks up one operation by canonical name.
    #[must_use]
    pub fn lookup(&self, name: &OperationName) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    /// Iterates all descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.values()
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true when no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the origin label recorded for an operation.
    #[must_use]
    pub fn source_of(&self, name: &OperationName) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }
}
