// crates/fabric-gate-server/src/loader.rs
// ============================================================================
// Module: Description and Guidance Loading
// Description: Filesystem sourcing of API descriptions and guidance overrides.
// Purpose: Feed registry and guidance snapshots from configured paths.
// Dependencies: fabric-gate-core, fabric-gate-registry, serde_json
// ============================================================================

//! ## Overview
//! API descriptions live as one JSON file per family in the configured
//! directory (`manage.json`, `analyze.json`, `infra.json`, `onemanage.json`).
//! Files whose stem is not a known family are skipped with a warning rather
//! than failing the load, matching how retired description files are phased
//! out in practice. Guidance overrides are one optional JSON document mapping
//! operation names to override records; a missing file yields an empty
//! snapshot.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use fabric_gate_core::ApiFamily;
use fabric_gate_core::GuidanceSnapshot;
use fabric_gate_registry::ApiDescription;
use fabric_gate_registry::document_info;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Description loading errors.
///
/// # Invariants
/// - `source` fields carry the offending file name verbatim.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The descriptions directory could not be listed.
    #[error("descriptions directory unreadable: {0}")]
    Directory(String),
    /// A description file could not be read.
    #[error("description file unreadable: {source_file}")]
    Read {
        /// File that failed to read.
        source_file: String,
    },
    /// A description file is not valid JSON.
    #[error("description file is not valid json: {source_file}")]
    Json {
        /// File that failed to parse.
        source_file: String,
    },
}

// ============================================================================
// SECTION: Description Loading
// ============================================================================

/// Loads every recognized API description from the directory.
///
/// # Errors
///
/// Returns [`LoadError`] when the directory cannot be listed or a recognized
/// file cannot be read or parsed as JSON. Structural validation happens later
/// in the registry load, which names the offending source.
pub fn load_descriptions(dir: &Path) -> Result<Vec<ApiDescription>, LoadError> {
    let entries =
        std::fs::read_dir(dir).map_err(|err| LoadError::Directory(err.to_string()))?;
    let mut descriptions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| LoadError::Directory(err.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
        let Some(family) = ApiFamily::parse(stem) else {
            tracing::warn!(file = %path.display(), "skipping unrecognized api description");
            continue;
        };
        let source_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(stem)
            .to_string();
        let text = std::fs::read_to_string(&path).map_err(|_| LoadError::Read {
            source_file: source_file.clone(),
        })?;
        let body = serde_json::from_str(&text).map_err(|_| LoadError::Json {
            source_file: source_file.clone(),
        })?;
        let info = document_info(&body);
        tracing::info!(
            file = %source_file,
            title = info.get("title").map_or("", String::as_str),
            version = info.get("version").map_or("", String::as_str),
            "loaded api description"
        );
        descriptions.push(ApiDescription::new(source_file, family, body));
    }
    descriptions.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(descriptions)
}

// ============================================================================
// SECTION: Guidance Loading
// ============================================================================

/// Loads guidance overrides, returning an empty snapshot when unavailable.
///
/// Guidance is supplied by an external collaborator; a missing or malformed
/// file degrades to base descriptions instead of failing the gateway.
#[must_use]
pub fn load_guidance(path: Option<&Path>) -> GuidanceSnapshot {
    let Some(path) = path else {
        return GuidanceSnapshot::new();
    };
    let Ok(text) = std::fs::read_to_string(path) else {
        tracing::warn!(file = %path.display(), "guidance file unreadable; using base descriptions");
        return GuidanceSnapshot::new();
    };
    match serde_json::from_str::<GuidanceSnapshot>(&text) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(file = %path.display(), error = %err, "guidance file malformed");
            GuidanceSnapshot::new()
        }
    }
}
