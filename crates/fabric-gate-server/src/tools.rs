// crates/fabric-gate-server/src/tools.rs
// ============================================================================
// Module: Tool Surface
// Description: Tool definitions and call translation over the registry.
// Purpose: Turn registry operations into callable tools for the agent.
// Dependencies: fabric-gate-core, fabric-gate-registry, serde_json
// ============================================================================

//! ## Overview
//! Every registry operation becomes one callable tool. The input schema is
//! derived from the operation: path placeholders are required string
//! properties, declared query parameters are optional, a `body` object is
//! offered when the operation accepts one, and every tool takes a required
//! `cluster` argument naming the target by id or unique name. Descriptions
//! come from the enricher so guidance overrides reach the agent without a
//! registry reload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use fabric_gate_core::ClusterId;
use fabric_gate_core::DirectoryStore;
use fabric_gate_core::GatewayError;
use fabric_gate_core::GuidanceSnapshot;
use fabric_gate_core::OperationDescriptor;
use fabric_gate_core::describe;
use fabric_gate_registry::RegistrySnapshot;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// One callable tool advertised to the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool name (the canonical operation name).
    pub name: String,
    /// Enriched human-facing description.
    pub description: String,
    /// JSON Schema for the tool arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Builds the advertised tool list from the current snapshots.
#[must_use]
pub fn tool_definitions(
    registry: &RegistrySnapshot,
    guidance: &GuidanceSnapshot,
) -> Vec<ToolDefinition> {
    registry
        .iter()
        .map(|operation| ToolDefinition {
            name: operation.name.as_str().to_string(),
            description: describe(operation, guidance),
            input_schema: input_schema(operation),
        })
        .collect()
}

/// Derives the argument schema for one operation.
fn input_schema(operation: &OperationDescriptor) -> Value {
    let mut properties = Map::new();
    let mut required = vec![Value::String("cluster".to_string())];
    properties.insert(
        "cluster".to_string(),
        json!({
            "type": "string",
            "description": "Target cluster id or unique cluster name",
        }),
    );
    for name in operation.path_template.placeholders() {
        properties.insert(
            name.to_string(),
            json!({
                "type": "string",
                "description": format!("Path parameter: {name}"),
            }),
        );
        required.push(Value::String(name.to_string()));
    }
    for name in &operation.query_parameters {
        properties.entry(name.clone()).or_insert_with(|| {
            json!({
                "type": "string",
                "description": format!("Query parameter: {name}"),
            })
        });
    }
    if operation.accepts_body {
        properties.insert(
            "body".to_string(),
            json!({
                "type": "object",
                "description": "Request body data",
            }),
        );
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

// ============================================================================
// SECTION: Call Argument Translation
// ============================================================================

/// Resolves the `cluster` argument to a cluster identifier.
///
/// Accepts a numeric id (number or numeric string) or a unique cluster name
/// looked up through the directory.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidParameters`] when the argument is missing
/// or unusable and [`GatewayError::ClusterNotFound`] for unknown names.
pub fn resolve_cluster_argument(
    directory: &dyn DirectoryStore,
    arguments: &Map<String, Value>,
) -> Result<ClusterId, GatewayError> {
    let Some(value) = arguments.get("cluster") else {
        return Err(GatewayError::InvalidParameters(
            "missing required argument: cluster".to_string(),
        ));
    };
    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(ClusterId::from_raw)
            .ok_or_else(|| GatewayError::InvalidParameters("cluster id must be a positive integer".to_string())),
        Value::String(text) => {
            if let Ok(raw) = text.parse::<i64>() {
                return ClusterId::from_raw(raw).ok_or_else(|| {
                    GatewayError::InvalidParameters(
                        "cluster id must be a positive integer".to_string(),
                    )
                });
            }
            let record = directory
                .cluster_by_name(text)
                .map_err(|err| GatewayError::Directory(err.to_string()))?;
            record.map(|cluster| cluster.id).ok_or_else(|| {
                GatewayError::InvalidParameters(format!("unknown cluster: {text}"))
            })
        }
        _ => Err(GatewayError::InvalidParameters(
            "cluster must be an id or a cluster name".to_string(),
        )),
    }
}

/// Strips transport-level arguments before dispatch.
///
/// The `cluster` key addresses the gateway, not the backend operation, so it
/// never reaches path, query, or body construction.
#[must_use]
pub fn operation_arguments(arguments: &Map<String, Value>) -> Map<String, Value> {
    let mut stripped = arguments.clone();
    stripped.remove("cluster");
    stripped
}
