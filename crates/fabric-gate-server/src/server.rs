// crates/fabric-gate-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: JSON-RPC 2.0 tool surface and admin routes on axum.
// Purpose: Expose tools/list, tools/call, registry reload, and audit export.
// Dependencies: fabric-gate-core, fabric-gate-dispatch, axum, tokio
// ============================================================================

//! ## Overview
//! The RPC surface speaks JSON-RPC 2.0 on `POST /rpc` with `tools/list` and
//! `tools/call`. Every request authenticates with a bearer token resolved
//! through the directory store. Tool calls run under `spawn_blocking`: the
//! blocking task keeps running even when the HTTP client disconnects, so the
//! backend call and its audit entry always complete. Admin routes cover the
//! registry reload trigger and the audit export read interface and require a
//! superuser token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use fabric_gate_core::Actor;
use fabric_gate_core::ActorId;
use fabric_gate_core::AuditQuery;
use fabric_gate_core::AuditStore;
use fabric_gate_core::ClusterId;
use fabric_gate_core::GatewayError;
use fabric_gate_core::HttpMethod;
use fabric_gate_core::OperationName;
use fabric_gate_dispatch::DispatchOutcome;
use fabric_gate_dispatch::DispatchRequest;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::state::GatewayState;
use crate::tools::operation_arguments;
use crate::tools::resolve_cluster_argument;
use crate::tools::tool_definitions;

// ============================================================================
// SECTION: Server Errors
// ============================================================================

/// Server lifecycle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration rejected at startup.
    #[error("server config error: {0}")]
    Config(String),
    /// Transport-level failure binding or serving.
    #[error("server transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Serving
// ============================================================================

/// Serves the gateway on the given bind address until the process exits.
///
/// # Errors
///
/// Returns [`ServerError`] when the address cannot be bound or the server
/// fails.
pub async fn serve(state: Arc<GatewayState>, bind: &str) -> Result<(), ServerError> {
    let addr: SocketAddr =
        bind.parse().map_err(|_| ServerError::Config("invalid bind address".to_string()))?;
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| ServerError::Transport("bind failed".to_string()))?;
    tracing::info!(%addr, "fabric gate listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|_| ServerError::Transport("server failed".to_string()))
}

/// Builds the axum router over the gateway state.
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/rpc", post(handle_rpc))
        .route("/admin/registry/reload", post(handle_reload))
        .route("/admin/audit", get(handle_audit_export))
        .route("/admin/audit/stats", get(handle_audit_stats))
        .route("/healthz", get(handle_health))
        .with_state(state)
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request transport context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Bearer token extracted from the Authorization header.
    pub bearer: Option<String>,
}

impl RequestContext {
    /// Extracts the context from connection info and headers.
    #[must_use]
    pub fn from_parts(peer: Option<SocketAddr>, headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Self {
            peer_ip: peer.map(|addr| addr.ip()),
            bearer,
        }
    }
}

// ============================================================================
// SECTION: JSON-RPC Envelope
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success envelope.
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error envelope.
    fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Returns the result payload, if any (used by tests).
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Returns the error code, if any (used by tests).
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().map(|error| error.code)
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    arguments: Value,
}

// ============================================================================
// SECTION: RPC Handling
// ============================================================================

/// Handles `POST /rpc`.
async fn handle_rpc(
    State(state): State<Arc<GatewayState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    let context = RequestContext::from_parts(Some(peer), &headers);
    if bytes.len() > state.max_body_bytes {
        let response =
            JsonRpcResponse::err(Value::Null, -32070, "request body too large");
        return (StatusCode::PAYLOAD_TOO_LARGE, axum::Json(response));
    }
    let Ok(request) = serde_json::from_slice::<JsonRpcRequest>(&bytes) else {
        let response = JsonRpcResponse::err(Value::Null, -32600, "invalid json-rpc request");
        return (StatusCode::BAD_REQUEST, axum::Json(response));
    };
    let (status, response) = process_rpc(&state, &context, request).await;
    (status, axum::Json(response))
}

/// Dispatches one JSON-RPC request.
pub async fn process_rpc(
    state: &Arc<GatewayState>,
    context: &RequestContext,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    if request.jsonrpc != "2.0" {
        return (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse::err(request.id, -32600, "invalid json-rpc version"),
        );
    }
    let actor = match authenticate(state, context) {
        Ok(actor) => actor,
        Err(response) => return (StatusCode::UNAUTHORIZED, response_with_id(request.id, response)),
    };
    match request.method.as_str() {
        "tools/list" => {
            let registry = state.registry.snapshot();
            let guidance = state.guidance.snapshot();
            let tools = tool_definitions(&registry, &guidance);
            match serde_json::to_value(tools) {
                Ok(tools) => (
                    StatusCode::OK,
                    JsonRpcResponse::ok(request.id, json!({"tools": tools})),
                ),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    JsonRpcResponse::err(request.id, -32060, "serialization failed"),
                ),
            }
        }
        "tools/call" => {
            let id = request.id;
            let params = request.params.unwrap_or(Value::Null);
            let Ok(call) = serde_json::from_value::<ToolCallParams>(params) else {
                return (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse::err(id, -32602, "invalid tool params"),
                );
            };
            let Value::Object(arguments) = call.arguments else {
                return (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse::err(id, -32602, "tool arguments must be an object"),
                );
            };
            let result = call_tool(state, context, actor, &call.name, arguments).await;
            (StatusCode::OK, JsonRpcResponse::ok(id, result))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse::err(request.id, -32601, "method not found"),
        ),
    }
}

/// Replaces the id on an auth-failure response built before parsing finished.
fn response_with_id(id: Value, response: JsonRpcResponse) -> JsonRpcResponse {
    JsonRpcResponse {
        id,
        ..response
    }
}

/// Resolves the caller or builds the JSON-RPC auth failure.
fn authenticate(
    state: &Arc<GatewayState>,
    context: &RequestContext,
) -> Result<Actor, JsonRpcResponse> {
    let Some(token) = &context.bearer else {
        return Err(JsonRpcResponse::err(Value::Null, -32001, "missing bearer token"));
    };
    state
        .authenticate(token)
        .map_err(|err| JsonRpcResponse::err(Value::Null, -32001, err.to_string()))
}

/// Executes one tool call on a blocking thread and shapes the result.
///
/// The returned value is either `{"status", "body"}` for dispatched calls
/// (success and backend error statuses alike) or `{"kind", "message"}` for
/// gateway errors.
async fn call_tool(
    state: &Arc<GatewayState>,
    context: &RequestContext,
    actor: Actor,
    name: &str,
    arguments: serde_json::Map<String, Value>,
) -> Value {
    let cluster_id = match resolve_cluster_argument(state.store.as_ref(), &arguments) {
        Ok(cluster_id) => cluster_id,
        Err(err) => return error_payload(&err),
    };
    let request = DispatchRequest {
        actor,
        operation_name: OperationName::new(name),
        cluster_id,
        arguments: operation_arguments(&arguments),
        client_ip: context.peer_ip.map(|ip| ip.to_string()),
    };
    let dispatcher = Arc::clone(&state.dispatcher);
    let joined =
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&request)).await;
    match joined {
        Ok(Ok(
            DispatchOutcome::Success {
                status,
                body,
            }
            | DispatchOutcome::Backend {
                status,
                body,
            },
        )) => json!({"status": status, "body": body}),
        Ok(Err(err)) => error_payload(&err),
        Err(_) => error_payload(&GatewayError::Transport("dispatch task failed".to_string())),
    }
}

/// Shapes a gateway error into the wire error object.
fn error_payload(err: &GatewayError) -> Value {
    json!({"kind": err.kind().as_str(), "message": err.to_string()})
}

// ============================================================================
// SECTION: Admin Routes
// ============================================================================

/// Audit export query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct AuditExportParams {
    /// Restrict to one cluster id.
    pub cluster_id: Option<i64>,
    /// Restrict to one actor id.
    pub actor_id: Option<i64>,
    /// Restrict to one operation name.
    pub operation: Option<String>,
    /// Restrict to one HTTP method.
    pub method: Option<String>,
    /// Lower timestamp bound (RFC 3339).
    pub since: Option<String>,
    /// Upper timestamp bound (RFC 3339).
    pub until: Option<String>,
    /// Restrict to entries carrying an error message.
    #[serde(default)]
    pub errors_only: bool,
    /// Page size.
    #[serde(default)]
    pub limit: usize,
    /// Page offset.
    #[serde(default)]
    pub offset: usize,
}

impl AuditExportParams {
    /// Converts wire parameters into a storage query.
    ///
    /// # Errors
    ///
    /// Returns a message naming the unusable parameter.
    pub fn into_query(self) -> Result<AuditQuery, String> {
        let since = self
            .since
            .map(|text| OffsetDateTime::parse(&text, &Rfc3339))
            .transpose()
            .map_err(|_| "since must be an RFC 3339 timestamp".to_string())?;
        let until = self
            .until
            .map(|text| OffsetDateTime::parse(&text, &Rfc3339))
            .transpose()
            .map_err(|_| "until must be an RFC 3339 timestamp".to_string())?;
        let http_method = self
            .method
            .map(|label| {
                HttpMethod::parse(&label).ok_or_else(|| format!("unknown method: {label}"))
            })
            .transpose()?;
        Ok(AuditQuery {
            cluster_id: self.cluster_id.and_then(ClusterId::from_raw),
            actor_id: self.actor_id.and_then(ActorId::from_raw),
            operation_name: self.operation.map(OperationName::new),
            http_method,
            since,
            until,
            errors_only: self.errors_only,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// Resolves a superuser caller or builds the admin error response.
fn authenticate_admin(
    state: &Arc<GatewayState>,
    headers: &HeaderMap,
) -> Result<Actor, (StatusCode, axum::Json<Value>)> {
    let context = RequestContext::from_parts(None, headers);
    let Some(token) = &context.bearer else {
        return Err(admin_error(StatusCode::UNAUTHORIZED, "invalid_token", "missing bearer token"));
    };
    let actor = state.authenticate(token).map_err(|err| {
        admin_error(StatusCode::UNAUTHORIZED, err.kind().as_str(), &err.to_string())
    })?;
    if !actor.is_superuser {
        return Err(admin_error(
            StatusCode::FORBIDDEN,
            "operation_not_in_role",
            "administrative access requires a superuser token",
        ));
    }
    Ok(actor)
}

/// Builds one admin error response.
fn admin_error(
    status: StatusCode,
    kind: &str,
    message: &str,
) -> (StatusCode, axum::Json<Value>) {
    (status, axum::Json(json!({"kind": kind, "message": message})))
}

/// Handles `POST /admin/registry/reload`.
async fn handle_reload(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> (StatusCode, axum::Json<Value>) {
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    match state.reload_registry() {
        Ok(loaded) => (StatusCode::OK, axum::Json(json!({"loaded_operations": loaded}))),
        Err(err) => admin_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "registry_parse_error",
            &err.to_string(),
        ),
    }
}

/// Handles `GET /admin/audit`.
async fn handle_audit_export(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Query(params): Query<AuditExportParams>,
) -> (StatusCode, axum::Json<Value>) {
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    let query = match params.into_query() {
        Ok(query) => query,
        Err(message) => {
            return admin_error(StatusCode::BAD_REQUEST, "invalid_parameters", &message);
        }
    };
    match state.store.query(&query) {
        Ok(entries) => match serde_json::to_value(&entries) {
            Ok(entries) => (StatusCode::OK, axum::Json(json!({"entries": entries}))),
            Err(_) => admin_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transport_error",
                "serialization failed",
            ),
        },
        Err(err) => admin_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "transport_error",
            &err.to_string(),
        ),
    }
}

/// Handles `GET /admin/audit/stats`.
async fn handle_audit_stats(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> (StatusCode, axum::Json<Value>) {
    if let Err(response) = authenticate_admin(&state, &headers) {
        return response;
    }
    match state.store.statistics() {
        Ok(stats) => match serde_json::to_value(&stats) {
            Ok(stats) => (StatusCode::OK, axum::Json(stats)),
            Err(_) => admin_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transport_error",
                "serialization failed",
            ),
        },
        Err(err) => admin_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "transport_error",
            &err.to_string(),
        ),
    }
}

/// Handles `GET /healthz`.
async fn handle_health(State(state): State<Arc<GatewayState>>) -> axum::Json<Value> {
    let registry = state.registry.snapshot();
    axum::Json(json!({"status": "ok", "operations": registry.len()}))
}

// ============================================================================
// SECTION: Test Support
// ============================================================================

impl JsonRpcRequest {
    /// Builds a request directly (used by tests).
    #[must_use]
    pub fn new(id: Value, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}
