// crates/fabric-gate-server/tests/config_validation.rs
// ============================================================================
// Module: Server Configuration Tests
// Description: TOML parsing, defaults, and validation coverage.
// Purpose: Validate that misconfiguration fails before startup.
// ============================================================================

//! ## Overview
//! Unit tests for configuration handling:
//! - A complete document parses with section defaults applied
//! - Invalid bind addresses and zero limits are rejected
//! - The master key resolves from the file when present

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use fabric_gate_server::GatewayConfig;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn minimal_toml() -> String {
    r#"
[server]
bind = "127.0.0.1:8643"

[database]
path = "/var/lib/fabric-gate/gateway.db"

[registry]
descriptions_dir = "/etc/fabric-gate/apis"
"#
    .to_string()
}

// ============================================================================
// SECTION: Parsing Tests
// ============================================================================

#[test]
fn minimal_document_parses_with_defaults() {
    let config = GatewayConfig::from_toml(&minimal_toml()).unwrap();
    assert_eq!(config.server.bind, "127.0.0.1:8643");
    assert_eq!(config.server.max_body_bytes, 1024 * 1024);
    assert_eq!(config.dispatch.timeout_ms, 30_000);
    assert!(config.registry.guidance_path.is_none());
    assert!(config.vault.master_key_base64.is_none());
}

#[test]
fn full_document_overrides_defaults() {
    let text = r#"
[server]
bind = "0.0.0.0:9000"
max_body_bytes = 65536

[database]
path = "gateway.db"
busy_timeout_ms = 250
journal_mode = "delete"
sync_mode = "normal"

[vault]
master_key_base64 = "c29tZSBrZXkgbWF0ZXJpYWwgZm9yIHRlc3RpbmchISE="

[registry]
descriptions_dir = "apis"
guidance_path = "guidance.json"

[dispatch]
timeout_ms = 5000
"#;
    let config = GatewayConfig::from_toml(text).unwrap();
    assert_eq!(config.server.max_body_bytes, 65_536);
    assert_eq!(config.dispatch.timeout_ms, 5_000);
    assert_eq!(config.database.busy_timeout_ms, 250);
    assert!(config.registry.guidance_path.is_some());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let result = GatewayConfig::from_toml("[server\nbind = ");
    assert!(result.is_err());
}

// ============================================================================
// SECTION: Validation Tests
// ============================================================================

#[test]
fn invalid_bind_address_is_rejected() {
    let text = minimal_toml().replace("127.0.0.1:8643", "not-an-address");
    let err = GatewayConfig::from_toml(&text).unwrap_err();
    assert!(err.to_string().contains("server.bind"));
}

#[test]
fn zero_body_cap_is_rejected() {
    let text = minimal_toml().replace(
        "bind = \"127.0.0.1:8643\"",
        "bind = \"127.0.0.1:8643\"\nmax_body_bytes = 0",
    );
    let err = GatewayConfig::from_toml(&text).unwrap_err();
    assert!(err.to_string().contains("max_body_bytes"));
}

#[test]
fn zero_timeout_is_rejected() {
    let text = format!("{}\n[dispatch]\ntimeout_ms = 0\n", minimal_toml());
    let err = GatewayConfig::from_toml(&text).unwrap_err();
    assert!(err.to_string().contains("timeout_ms"));
}

// ============================================================================
// SECTION: Key Resolution Tests
// ============================================================================

#[test]
fn master_key_resolves_from_the_file() {
    let text = format!(
        "{}\n[vault]\nmaster_key_base64 = \"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=\"\n",
        minimal_toml()
    );
    let config = GatewayConfig::from_toml(&text).unwrap();
    assert_eq!(
        config.master_key_base64().unwrap(),
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
    );
}
