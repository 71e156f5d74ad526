// crates/fabric-gate-registry/src/description.rs
// ============================================================================
// Module: API Descriptions
// Description: Raw backend API description documents and their validation.
// Purpose: Decode the OpenAPI-shaped subset the registry consumes.
// Dependencies: fabric-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ApiDescription`] pairs one API family with the JSON description
//! document published for it. Only the subset the gateway needs is decoded:
//! document info, paths, per-method operations, and their parameters.
//! Validation reports every structural problem at once so operators can fix
//! a description in one pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use fabric_gate_core::ApiFamily;
use fabric_gate_core::HttpMethod;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Description Documents
// ============================================================================

/// One backend API description supplied to the registry.
///
/// # Invariants
/// - `source` labels the document origin (file name or upload label) and is
///   used verbatim in load errors.
#[derive(Debug, Clone)]
pub struct ApiDescription {
    /// Origin label used in error reporting.
    pub source: String,
    /// API family the document describes.
    pub family: ApiFamily,
    /// Raw JSON description body.
    pub body: Value,
}

impl ApiDescription {
    /// Creates a description from its parts.
    #[must_use]
    pub fn new(source: impl Into<String>, family: ApiFamily, body: Value) -> Self {
        Self {
            source: source.into(),
            family,
            body,
        }
    }

    /// Validates the basic document structure.
    ///
    /// Returns the list of structural problems, empty when the document is
    /// usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let Value::Object(root) = &self.body else {
            errors.push("document root must be an object".to_string());
            return errors;
        };
        if !root.contains_key("openapi") {
            errors.push("missing 'openapi' version field".to_string());
        }
        match root.get("info") {
            None => errors.push("missing 'info' section".to_string()),
            Some(Value::Object(info)) => {
                if !info.contains_key("title") {
                    errors.push("missing 'info.title' field".to_string());
                }
            }
            Some(_) => errors.push("'info' must be an object".to_string()),
        }
        match root.get("paths") {
            None => errors.push("missing 'paths' section".to_string()),
            Some(Value::Object(paths)) if paths.is_empty() => {
                errors.push("'paths' section is empty".to_string());
            }
            Some(Value::Object(_)) => {}
            Some(_) => errors.push("'paths' must be an object".to_string()),
        }
        errors
    }
}

// ============================================================================
// SECTION: Decoded Operations
// ============================================================================

/// One operation entry decoded from a description document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawOperation {
    /// Stable operation identifier from the description.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Short summary text.
    #[serde(default)]
    pub summary: String,
    /// Long description text.
    #[serde(default)]
    pub description: String,
    /// Declared parameters.
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    /// Request body declaration, present when the operation accepts one.
    #[serde(rename = "requestBody")]
    pub request_body: Option<Value>,
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawParameter {
    /// Parameter name.
    pub name: Option<String>,
    /// Parameter location (`path`, `query`, `header`, ...).
    #[serde(rename = "in", default)]
    pub location: String,
}

/// Extracts the per-method operation maps from a validated document.
///
/// Yields `(path, method, operation)` for the methods the gateway
/// dispatches. Non-method path-item keys (`servers`, `parameters`,
/// extensions) are skipped.
pub(crate) fn operations_of(
    body: &Value,
) -> impl Iterator<Item = (String, HttpMethod, RawOperation)> + '_ {
    /// Method keys recognized inside a path item.
    const METHOD_KEYS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options"];
    let paths = body
        .get("paths")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(serde_json::Map::new);
    paths.into_iter().flat_map(|(path, item)| {
        let item = item.as_object().cloned().unwrap_or_else(serde_json::Map::new);
        let entries: Vec<(String, HttpMethod, RawOperation)> = METHOD_KEYS
            .iter()
            .filter_map(|label| {
                let raw = item.get(*label)?;
                let method = HttpMethod::parse(label)?;
                let operation = serde_json::from_value::<RawOperation>(raw.clone()).ok()?;
                Some((path.clone(), method, operation))
            })
            .collect();
        entries
    })
}

/// Returns the query parameter names declared by an operation.
pub(crate) fn query_parameter_names(operation: &RawOperation) -> Vec<String> {
    operation
        .parameters
        .iter()
        .filter(|param| param.location == "query")
        .filter_map(|param| param.name.clone())
        .collect()
}

/// Returns the document info fields used for logging and listings.
#[must_use]
pub fn document_info(body: &Value) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    if let Some(section) = body.get("info").and_then(Value::as_object) {
        for key in ["title", "version", "description"] {
            if let Some(value) = section.get(key).and_then(Value::as_str) {
                info.insert(key.to_string(), value.to_string());
            }
        }
    }
    info
}
