// crates/fabric-gate-dispatch/src/dispatcher.rs
// ============================================================================
// Module: Dispatcher
// Description: Tool-call execution pipeline against backend clusters.
// Purpose: Authorize, dispatch, classify, and audit one call end to end.
// Dependencies: fabric-gate-core, fabric-gate-registry, fabric-gate-vault, reqwest
// ============================================================================

//! ## Overview
//! [`Dispatcher::dispatch`] runs the full pipeline for one tool call:
//! registry lookup, policy decision, cluster resolution, path and query
//! construction, scoped credential access, and the bounded backend HTTP
//! call. The pipeline body is a separate function whose result always flows
//! through one audit point in `dispatch`, so no return path, including early
//! denials, can skip the audit entry. Each call builds its own HTTP client,
//! carrying the cluster's TLS verification policy without any global
//! override, and failures map onto the gateway taxonomy: denials and
//! backend error statuses are expected outcomes, transport failures are
//! caller-retryable, and credential faults mark the cluster unavailable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use fabric_gate_core::Actor;
use fabric_gate_core::AuditEntry;
use fabric_gate_core::ClusterId;
use fabric_gate_core::ClusterRecord;
use fabric_gate_core::Decision;
use fabric_gate_core::DirectoryStore;
use fabric_gate_core::GatewayError;
use fabric_gate_core::HttpMethod;
use fabric_gate_core::MAX_AUDIT_BODY_BYTES;
use fabric_gate_core::OperationDescriptor;
use fabric_gate_core::OperationName;
use fabric_gate_core::authorize;
use fabric_gate_core::redact_credentials;
use fabric_gate_core::truncate_body;
use fabric_gate_registry::RegistrySnapshot;
use fabric_gate_registry::SharedRegistry;
use fabric_gate_vault::Vault;
use reqwest::Method;
use reqwest::blocking::Client;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use url::Url;

use crate::recorder::AuditRecorder;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Dispatcher tuning knobs.
///
/// # Invariants
/// - `timeout_ms` bounds the full backend request lifecycle.
/// - `audit_body_cap` bounds persisted response bodies, not the transfer.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Backend request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum serialized response body size persisted in audit entries.
    pub audit_body_cap: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            audit_body_cap: MAX_AUDIT_BODY_BYTES,
            user_agent: "fabric-gate/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Requests and Outcomes
// ============================================================================

/// One tool call to execute.
///
/// # Invariants
/// - `arguments` carries path parameters, query parameters, and an optional
///   `body` key holding the JSON request body.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Resolved caller identity.
    pub actor: Actor,
    /// Operation to execute.
    pub operation_name: OperationName,
    /// Target cluster.
    pub cluster_id: ClusterId,
    /// Caller-supplied arguments.
    pub arguments: Map<String, Value>,
    /// Originating client IP for audit attribution.
    pub client_ip: Option<String>,
}

/// Terminal classification of a dispatched backend call.
///
/// # Invariants
/// - `Backend` carries the backend's own error status verbatim; it is not a
///   gateway fault and is never retried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Backend accepted the call (status below 400).
    Success {
        /// Backend response status.
        status: u16,
        /// Backend response body.
        body: Value,
    },
    /// Backend returned an error status (4xx/5xx), forwarded verbatim.
    Backend {
        /// Backend response status.
        status: u16,
        /// Backend response body.
        body: Value,
    },
}

/// Result of one dispatch attempt.
pub type DispatchResult = Result<DispatchOutcome, GatewayError>;

// ============================================================================
// SECTION: Attempt Trace
// ============================================================================

/// Mutable record of what the pipeline learned before it resolved.
///
/// The trace lets the single audit point build a fully populated entry no
/// matter how early the pipeline bailed out.
#[derive(Debug, Default)]
struct AttemptTrace {
    /// HTTP method, once the operation resolved.
    method: Option<HttpMethod>,
    /// Backend path: rendered when substitution succeeded, template
    /// otherwise, empty when the operation never resolved.
    path: String,
    /// Request body supplied by the caller.
    request_body: Option<Value>,
    /// Backend response status, when a response arrived.
    response_status: Option<u16>,
    /// Backend response body, when a response arrived.
    response_body: Option<Value>,
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Tool-call dispatcher over the registry, directory, and vault.
///
/// # Invariants
/// - Stateless per call; safe to share across concurrent dispatches.
/// - Every dispatch records exactly one audit entry.
pub struct Dispatcher {
    /// Shared operation registry.
    registry: Arc<SharedRegistry>,
    /// Directory of actors, clusters, and settings.
    directory: Arc<dyn DirectoryStore>,
    /// Credential vault.
    vault: Arc<Vault>,
    /// Audit recorder invoked on every exit path.
    recorder: AuditRecorder,
    /// Tuning knobs.
    config: DispatchConfig,
}

impl Dispatcher {
    /// Creates a dispatcher over the given collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<SharedRegistry>,
        directory: Arc<dyn DirectoryStore>,
        vault: Arc<Vault>,
        recorder: AuditRecorder,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            directory,
            vault,
            recorder,
            config,
        }
    }

    /// Executes one tool call and records exactly one audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] for denials, unresolved targets, credential
    /// faults, and transport failures; backend error statuses are carried in
    /// the `Ok` outcome instead.
    pub fn dispatch(&self, request: &DispatchRequest) -> DispatchResult {
        let registry = self.registry.snapshot();
        let mut trace = AttemptTrace::default();
        let result = self.attempt(&registry, request, &mut trace);
        let entry = build_entry(request, trace, &result, self.config.audit_body_cap);
        self.recorder.record(&entry);
        result
    }

    /// Pipeline body; every return value flows through the audit point.
    fn attempt(
        &self,
        registry: &RegistrySnapshot,
        request: &DispatchRequest,
        trace: &mut AttemptTrace,
    ) -> DispatchResult {
        let Some(operation) = registry.lookup(&request.operation_name) else {
            return Err(GatewayError::UnknownOperation(request.operation_name.clone()));
        };
        trace.method = Some(operation.http_method);
        trace.path = operation.path_template.as_str().to_string();
        trace.request_body = request.arguments.get("body").cloned();

        let settings = self
            .directory
            .settings()
            .map_err(|err| GatewayError::Directory(err.to_string()))?;
        if let Decision::Deny(reason) =
            authorize(&request.actor, Some(operation), request.cluster_id, settings)
        {
            return Err(GatewayError::Forbidden(reason));
        }

        let cluster = self
            .directory
            .cluster(request.cluster_id)
            .map_err(|err| GatewayError::Directory(err.to_string()))?
            .ok_or(GatewayError::ClusterNotFound(request.cluster_id))?;
        if !cluster.is_active {
            return Err(GatewayError::ClusterInactive(cluster.id));
        }

        let rendered = render_path(operation, &request.arguments)?;
        let backend_path = operation.backend_path(&rendered);
        trace.path = backend_path.clone();
        let query = query_pairs(operation, &request.arguments);

        self.execute(operation, &cluster, &backend_path, &query, trace)
    }

    /// Performs the backend HTTP call inside a scoped credential access.
    fn execute(
        &self,
        operation: &OperationDescriptor,
        cluster: &ClusterRecord,
        path: &str,
        query: &[(String, String)],
        trace: &mut AttemptTrace,
    ) -> DispatchResult {
        let target = format!("{}{path}", cluster.base_url.trim_end_matches('/'));
        let url = Url::parse(&target)
            .map_err(|_| GatewayError::Transport("invalid cluster base url".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .user_agent(self.config.user_agent.clone())
            .danger_accept_invalid_certs(!cluster.verify_ssl)
            .build()
            .map_err(|_| GatewayError::Transport("http client build failed".to_string()))?;

        let outbound = self
            .vault
            .with_decrypted(cluster.id, &cluster.credential, |secret| {
                let mut builder = client
                    .request(method_of(operation.http_method), url.clone())
                    .basic_auth(&cluster.username, Some(secret));
                if !query.is_empty() {
                    builder = builder.query(query);
                }
                if let Some(body) = &trace.request_body {
                    builder = builder.json(body);
                }
                builder.build()
            })
            .map_err(|err| {
                tracing::error!(cluster = %cluster.id, error = %err, "cluster unavailable");
                GatewayError::CredentialUnavailable(cluster.id)
            })?
            .map_err(|_| GatewayError::Transport("request build failed".to_string()))?;

        let response = match client.execute(outbound) {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return Err(GatewayError::Transport("timeout".to_string()));
            }
            Err(_) => {
                return Err(GatewayError::Transport("backend request failed".to_string()));
            }
        };

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        let body = if is_json {
            response
                .json::<Value>()
                .map_err(|_| GatewayError::Transport("failed to read response".to_string()))?
        } else {
            let text = response
                .text()
                .map_err(|_| GatewayError::Transport("failed to read response".to_string()))?;
            json!({"data": text, "status_code": status})
        };
        trace.response_status = Some(status);
        trace.response_body = Some(body.clone());

        if status >= 400 {
            Ok(DispatchOutcome::Backend {
                status,
                body,
            })
        } else {
            Ok(DispatchOutcome::Success {
                status,
                body,
            })
        }
    }
}

// ============================================================================
// SECTION: Request Construction Helpers
// ============================================================================

/// Maps the descriptor method onto the client method type.
fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// Renders the operation path from caller arguments.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidParameters`] when a placeholder has no
/// usable argument value.
fn render_path(
    operation: &OperationDescriptor,
    arguments: &Map<String, Value>,
) -> Result<String, GatewayError> {
    let mut values = BTreeMap::new();
    for name in operation.path_template.placeholders() {
        let Some(value) = arguments.get(name).and_then(scalar_string) else {
            return Err(GatewayError::InvalidParameters(format!(
                "missing required path parameter: {name}"
            )));
        };
        values.insert(name.to_string(), value);
    }
    operation
        .path_template
        .render(&values)
        .map_err(|name| GatewayError::InvalidParameters(format!(
            "missing required path parameter: {name}"
        )))
}

/// Collects query pairs from the arguments not consumed by the path or body.
fn query_pairs(
    operation: &OperationDescriptor,
    arguments: &Map<String, Value>,
) -> Vec<(String, String)> {
    let placeholders: BTreeSet<&str> =
        operation.path_template.placeholders().into_iter().collect();
    arguments
        .iter()
        .filter(|(key, _)| key.as_str() != "body" && !placeholders.contains(key.as_str()))
        .filter_map(|(key, value)| scalar_string(value).map(|value| (key.clone(), value)))
        .collect()
}

/// Stringifies a scalar JSON value for path or query use.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Audit Entry Construction
// ============================================================================

/// Builds the single audit entry for a resolved attempt.
fn build_entry(
    request: &DispatchRequest,
    trace: AttemptTrace,
    result: &DispatchResult,
    body_cap: usize,
) -> AuditEntry {
    let error_message = match result {
        Ok(_) => None,
        Err(GatewayError::Forbidden(reason)) => Some(reason.as_str().to_string()),
        Err(GatewayError::Transport(message)) => Some(message.clone()),
        Err(err) => Some(err.to_string()),
    };
    AuditEntry {
        cluster_id: Some(request.cluster_id),
        actor_id: request.actor.id,
        actor_name: request.actor.username.clone(),
        operation_name: request.operation_name.clone(),
        http_method: trace.method,
        path: trace.path,
        request_body: trace.request_body.map(redact_credentials),
        response_status: trace.response_status,
        response_body: trace.response_body.map(|body| truncate_body(body, body_cap)),
        error_message,
        client_ip: request.client_ip.clone(),
        timestamp: OffsetDateTime::now_utc(),
    }
}
