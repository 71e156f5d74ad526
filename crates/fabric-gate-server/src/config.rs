// crates/fabric-gate-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: TOML configuration for the gateway server process.
// Purpose: Collect bind, storage, vault, registry, and dispatch settings.
// Dependencies: serde, toml, fabric-gate-store-sqlite
// ============================================================================

//! ## Overview
//! One TOML file configures the whole process. The vault master key is the
//! only secret and may come from the `FABRIC_GATE_KEY` environment variable
//! instead of the file; everything else is plain settings. Validation runs
//! before any component is constructed so misconfiguration fails at startup,
//! not mid-dispatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use fabric_gate_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable consulted for the vault master key.
pub const KEY_ENV_VAR: &str = "FABRIC_GATE_KEY";

/// Default request body cap for the RPC surface.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default backend dispatch timeout.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Messages never contain the master key material.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("config file unreadable: {0}")]
    Io(String),
    /// The configuration file failed to parse.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A setting failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// HTTP surface settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Socket address the server binds to.
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Returns the default request body cap.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Vault settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultSection {
    /// Base64-encoded 32-byte master key; `FABRIC_GATE_KEY` takes precedence.
    #[serde(default)]
    pub master_key_base64: Option<String>,
}

/// Registry source settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySection {
    /// Directory of `<family>.json` API description files.
    pub descriptions_dir: PathBuf,
    /// Optional guidance override file.
    #[serde(default)]
    pub guidance_path: Option<PathBuf>,
}

/// Dispatch tuning settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchSection {
    /// Backend request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Returns the default dispatch timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Full gateway server configuration.
///
/// # Invariants
/// - `validate` has passed before any component consumes the values.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// HTTP surface settings.
    pub server: ServerSection,
    /// Database settings.
    pub database: SqliteStoreConfig,
    /// Vault settings.
    #[serde(default)]
    pub vault: VaultSection,
    /// Registry source settings.
    pub registry: RegistrySection,
    /// Dispatch tuning settings.
    #[serde(default)]
    pub dispatch: DispatchSection,
}

impl GatewayConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, malformed, or
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_toml(&text)
    }

    /// Validates settings that cannot be checked by deserialization alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_body_bytes must be > 0".to_string()));
        }
        if self.dispatch.timeout_ms == 0 {
            return Err(ConfigError::Invalid("dispatch.timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }

    /// Resolves the master key, preferring the environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no key is configured anywhere.
    pub fn master_key_base64(&self) -> Result<String, ConfigError> {
        if let Ok(value) = std::env::var(KEY_ENV_VAR) {
            if !value.trim().is_empty() {
                return Ok(value);
            }
        }
        self.vault.master_key_base64.clone().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "vault.master_key_base64 is not set and {KEY_ENV_VAR} is empty"
            ))
        })
    }
}
