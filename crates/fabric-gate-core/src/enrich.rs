// crates/fabric-gate-core/src/enrich.rs
// ============================================================================
// Module: Tool Description Enricher
// Description: Composition of base operation text with guidance overrides.
// Purpose: Produce the human-facing descriptions handed to the calling agent.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The enricher merges an operation's base description with override text
//! supplied by the external guidance collaborator. It is a pure function of
//! its two inputs: with no override the base text is returned verbatim, and
//! the guidance snapshot is swapped atomically alongside the registry so a
//! listing never mixes two guidance generations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::OperationName;
use crate::core::operation::OperationDescriptor;

// ============================================================================
// SECTION: Guidance Overrides
// ============================================================================

/// Override text for one operation from the guidance collaborator.
///
/// # Invariants
/// - Read-only inside the gateway; upserts happen in the excluded admin layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceOverride {
    /// Replacement long-form description appended to the base text.
    pub enhanced_description: Option<String>,
    /// Short usage hint appended after the description.
    pub usage_hint: Option<String>,
}

/// Immutable snapshot of all guidance overrides keyed by operation name.
pub type GuidanceSnapshot = BTreeMap<OperationName, GuidanceOverride>;

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Composes the tool description for an operation.
///
/// The base text is `"{METHOD} {path}"`, extended with the summary when one
/// exists and the long-form base description when it adds anything beyond
/// the summary. An override appends its enhanced description as a separate
/// paragraph and its usage hint as a bracketed trailer. Without an override
/// the base text is returned unchanged.
#[must_use]
pub fn describe(operation: &OperationDescriptor, guidance: &GuidanceSnapshot) -> String {
    let mut text = format!("{} {}", operation.http_method, operation.path_template);
    if !operation.summary.is_empty() {
        text.push_str(" - ");
        text.push_str(&operation.summary);
    }
    if !operation.description.is_empty() && operation.description != operation.summary {
        text.push_str("\n\n");
        text.push_str(&operation.description);
    }
    let Some(override_text) = guidance.get(&operation.name) else {
        return text;
    };
    if let Some(enhanced) = &override_text.enhanced_description {
        text.push_str("\n\n");
        text.push_str(enhanced);
    }
    if let Some(hint) = &override_text.usage_hint {
        text.push_str("\n\n[Hint: ");
        text.push_str(hint);
        text.push(']');
    }
    text
}
