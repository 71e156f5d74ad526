// crates/fabric-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Gateway Store
// Description: Durable directory and audit storage on a WAL SQLite database.
// Purpose: Back the storage ports with synchronous, indexed persistence.
// Dependencies: fabric-gate-core, rusqlite, serde_json, time
// ============================================================================

//! ## Overview
//! The store opens one connection, applies journal and synchronous pragmas,
//! and creates the schema on first use. Audit appends are synchronous
//! inserts; there is no write buffer to lose on process exit. Directory
//! reads reconstruct request-scoped [`Actor`] and [`ClusterRecord`] values
//! per call. JSON bodies are stored as serialized text and timestamps as
//! RFC 3339 strings, keeping the export schema stable for log shippers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use fabric_gate_core::Actor;
use fabric_gate_core::ActorId;
use fabric_gate_core::AuditEntry;
use fabric_gate_core::AuditQuery;
use fabric_gate_core::AuditStatistics;
use fabric_gate_core::AuditStore;
use fabric_gate_core::AuditStoreError;
use fabric_gate_core::ClusterId;
use fabric_gate_core::ClusterRecord;
use fabric_gate_core::DirectoryError;
use fabric_gate_core::DirectoryStore;
use fabric_gate_core::GatewaySettings;
use fabric_gate_core::HttpMethod;
use fabric_gate_core::OperationName;
use fabric_gate_core::RoleId;
use fabric_gate_core::RoleRecord;
use fabric_gate_core::SealedCredential;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schema version recorded in `user_version`.
const SCHEMA_VERSION: i64 = 1;

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Default audit query page size when the caller passes zero.
const DEFAULT_QUERY_LIMIT: usize = 100;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the gateway store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Underlying database failure.
    #[error("sqlite store error: {0}")]
    Database(String),
    /// Stored data failed to decode.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<SqliteStoreError> for DirectoryError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Database(message) => Self::Io(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<SqliteStoreError> for AuditStoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Database(message) => Self::Io(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Schema statements applied on first open.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS clusters (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    base_url TEXT NOT NULL,
    username TEXT NOT NULL,
    credential_sealed TEXT NOT NULL,
    verify_ssl INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    edit_mode_enabled INTEGER NOT NULL DEFAULT 0,
    is_administrator INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS role_operations (
    role_id INTEGER NOT NULL,
    operation_name TEXT NOT NULL,
    UNIQUE (role_id, operation_name)
);
CREATE TABLE IF NOT EXISTS actors (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    api_token TEXT UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_superuser INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS actor_roles (
    actor_id INTEGER NOT NULL,
    role_id INTEGER NOT NULL,
    UNIQUE (actor_id, role_id)
);
CREATE TABLE IF NOT EXISTS actor_clusters (
    actor_id INTEGER NOT NULL,
    cluster_id INTEGER NOT NULL,
    UNIQUE (actor_id, cluster_id)
);
CREATE TABLE IF NOT EXISTS gateway_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    edit_mode_enabled INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cluster_id INTEGER,
    actor_id INTEGER NOT NULL,
    actor_name TEXT NOT NULL,
    operation_name TEXT NOT NULL,
    http_method TEXT,
    path TEXT NOT NULL,
    request_body TEXT,
    response_status INTEGER,
    response_body TEXT,
    error_message TEXT,
    client_ip TEXT,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log (timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_audit_operation ON audit_log (operation_name);
CREATE INDEX IF NOT EXISTS idx_audit_cluster ON audit_log (cluster_id);
CREATE INDEX IF NOT EXISTS idx_audit_actor ON audit_log (actor_id);
";

// ============================================================================
// SECTION: Store
// ============================================================================

/// SQLite-backed implementation of the directory and audit ports.
///
/// # Invariants
/// - Audit appends are synchronous; nothing is buffered in memory.
/// - The connection is serialized behind a mutex; the store is safe to share
///   across concurrent dispatches.
pub struct SqliteGatewayStore {
    /// Serialized database connection.
    conn: Mutex<Connection>,
}

impl SqliteGatewayStore {
    /// Opens (and on first use creates) the gateway database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or the
    /// schema cannot be applied.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            config.journal_mode.pragma_value()
        ))?;
        conn.execute_batch(&format!(
            "PRAGMA synchronous = {};",
            config.sync_mode.pragma_value()
        ))?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > SCHEMA_VERSION {
            return Err(SqliteStoreError::Invalid(format!(
                "database schema version {version} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        conn.execute_batch(SCHEMA)?;
        conn.execute("INSERT OR IGNORE INTO gateway_settings (id) VALUES (1)", [])?;
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquires the connection, recovering from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ------------------------------------------------------------------
    // Provisioning (owned by the external admin surface; used for seeding)
    // ------------------------------------------------------------------

    /// Inserts a cluster record and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails (including name
    /// uniqueness violations).
    pub fn insert_cluster(
        &self,
        name: &str,
        base_url: &str,
        username: &str,
        credential: &SealedCredential,
        verify_ssl: bool,
    ) -> Result<ClusterId, SqliteStoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO clusters (name, base_url, username, credential_sealed, verify_ssl)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, base_url, username, credential.as_str(), verify_ssl],
        )?;
        ClusterId::from_raw(conn.last_insert_rowid())
            .ok_or_else(|| SqliteStoreError::Invalid("cluster id must be non-zero".to_string()))
    }

    /// Marks a cluster active or inactive.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the update fails.
    pub fn set_cluster_active(&self, id: ClusterId, active: bool) -> Result<(), SqliteStoreError> {
        self.lock().execute(
            "UPDATE clusters SET is_active = ?2 WHERE id = ?1",
            params![id.get(), active],
        )?;
        Ok(())
    }

    /// Inserts a role with its permitted operations and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn insert_role(
        &self,
        name: &str,
        edit_mode_enabled: bool,
        is_administrator: bool,
        operations: &[&str],
    ) -> Result<RoleId, SqliteStoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO roles (name, edit_mode_enabled, is_administrator) VALUES (?1, ?2, ?3)",
            params![name, edit_mode_enabled, is_administrator],
        )?;
        let role_id = conn.last_insert_rowid();
        for operation in operations {
            conn.execute(
                "INSERT OR IGNORE INTO role_operations (role_id, operation_name) VALUES (?1, ?2)",
                params![role_id, operation],
            )?;
        }
        RoleId::from_raw(role_id)
            .ok_or_else(|| SqliteStoreError::Invalid("role id must be non-zero".to_string()))
    }

    /// Inserts an actor and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn insert_actor(
        &self,
        username: &str,
        api_token: &str,
        is_superuser: bool,
    ) -> Result<ActorId, SqliteStoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO actors (username, api_token, is_superuser) VALUES (?1, ?2, ?3)",
            params![username, api_token, is_superuser],
        )?;
        ActorId::from_raw(conn.last_insert_rowid())
            .ok_or_else(|| SqliteStoreError::Invalid("actor id must be non-zero".to_string()))
    }

    /// Grants a role to an actor.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn assign_role(&self, actor: ActorId, role: RoleId) -> Result<(), SqliteStoreError> {
        self.lock().execute(
            "INSERT OR IGNORE INTO actor_roles (actor_id, role_id) VALUES (?1, ?2)",
            params![actor.get(), role.get()],
        )?;
        Ok(())
    }

    /// Assigns a cluster to an actor.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn assign_cluster(
        &self,
        actor: ActorId,
        cluster: ClusterId,
    ) -> Result<(), SqliteStoreError> {
        self.lock().execute(
            "INSERT OR IGNORE INTO actor_clusters (actor_id, cluster_id) VALUES (?1, ?2)",
            params![actor.get(), cluster.get()],
        )?;
        Ok(())
    }

    /// Sets the global edit-mode switch.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the update fails.
    pub fn set_edit_mode(&self, enabled: bool) -> Result<(), SqliteStoreError> {
        self.lock().execute(
            "UPDATE gateway_settings SET edit_mode_enabled = ?1 WHERE id = 1",
            params![enabled],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Row decoding
    // ------------------------------------------------------------------

    /// Loads the roles held by an actor, operations included.
    fn roles_of(conn: &Connection, actor_id: i64) -> Result<Vec<RoleRecord>, SqliteStoreError> {
        let mut statement = conn.prepare(
            "SELECT r.id, r.name, r.edit_mode_enabled, r.is_administrator
             FROM roles r JOIN actor_roles ar ON ar.role_id = r.id
             WHERE ar.actor_id = ?1 ORDER BY r.id",
        )?;
        let rows = statement.query_map(params![actor_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?;
        let mut roles = Vec::new();
        for row in rows {
            let (id, name, edit_mode_enabled, is_administrator) = row?;
            let mut operations_statement = conn.prepare(
                "SELECT operation_name FROM role_operations WHERE role_id = ?1",
            )?;
            let operations = operations_statement
                .query_map(params![id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<String>, _>>()?
                .into_iter()
                .map(OperationName::new)
                .collect::<BTreeSet<OperationName>>();
            roles.push(RoleRecord {
                id: RoleId::from_raw(id).ok_or_else(|| {
                    SqliteStoreError::Invalid("role id must be non-zero".to_string())
                })?,
                name,
                edit_mode_enabled,
                is_administrator,
                operations,
            });
        }
        Ok(roles)
    }

    /// Loads the cluster set assigned to an actor.
    fn clusters_of(
        conn: &Connection,
        actor_id: i64,
    ) -> Result<BTreeSet<ClusterId>, SqliteStoreError> {
        let mut statement =
            conn.prepare("SELECT cluster_id FROM actor_clusters WHERE actor_id = ?1")?;
        let raw_ids = statement
            .query_map(params![actor_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        let mut clusters = BTreeSet::new();
        for raw in raw_ids {
            clusters.insert(ClusterId::from_raw(raw).ok_or_else(|| {
                SqliteStoreError::Invalid("cluster id must be non-zero".to_string())
            })?);
        }
        Ok(clusters)
    }

    /// Decodes one cluster row.
    fn decode_cluster(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClusterRecord> {
        let raw_id: i64 = row.get(0)?;
        let id = ClusterId::from_raw(raw_id)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, raw_id))?;
        Ok(ClusterRecord {
            id,
            name: row.get(1)?,
            base_url: row.get(2)?,
            username: row.get(3)?,
            credential: SealedCredential::new(row.get::<_, String>(4)?),
            verify_ssl: row.get(5)?,
            is_active: row.get(6)?,
        })
    }

    /// Column list shared by cluster queries.
    const CLUSTER_COLUMNS: &'static str =
        "id, name, base_url, username, credential_sealed, verify_ssl, is_active";
}

// ============================================================================
// SECTION: Directory Port
// ============================================================================

impl DirectoryStore for SqliteGatewayStore {
    fn resolve_token(&self, token: &str) -> Result<Option<Actor>, DirectoryError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT id, username, is_superuser FROM actors
                 WHERE api_token = ?1 AND is_active = 1",
                params![token],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(SqliteStoreError::from)?;
        let Some((raw_id, username, is_superuser)) = row else {
            return Ok(None);
        };
        let roles = Self::roles_of(&conn, raw_id)?;
        let assigned_clusters = Self::clusters_of(&conn, raw_id)?;
        let id = ActorId::from_raw(raw_id).ok_or_else(|| {
            DirectoryError::Invalid("actor id must be non-zero".to_string())
        })?;
        Ok(Some(Actor {
            id,
            username,
            roles,
            assigned_clusters,
            is_superuser,
        }))
    }

    fn cluster(&self, id: ClusterId) -> Result<Option<ClusterRecord>, DirectoryError> {
        let conn = self.lock();
        let sql = format!("SELECT {} FROM clusters WHERE id = ?1", Self::CLUSTER_COLUMNS);
        let row = conn
            .query_row(&sql, params![id.get()], Self::decode_cluster)
            .optional()
            .map_err(SqliteStoreError::from)?;
        Ok(row)
    }

    fn cluster_by_name(&self, name: &str) -> Result<Option<ClusterRecord>, DirectoryError> {
        let conn = self.lock();
        let sql = format!("SELECT {} FROM clusters WHERE name = ?1", Self::CLUSTER_COLUMNS);
        let row = conn
            .query_row(&sql, params![name], Self::decode_cluster)
            .optional()
            .map_err(SqliteStoreError::from)?;
        Ok(row)
    }

    fn clusters(&self, active_only: bool) -> Result<Vec<ClusterRecord>, DirectoryError> {
        let conn = self.lock();
        let sql = if active_only {
            format!("SELECT {} FROM clusters WHERE is_active = 1 ORDER BY id", Self::CLUSTER_COLUMNS)
        } else {
            format!("SELECT {} FROM clusters ORDER BY id", Self::CLUSTER_COLUMNS)
        };
        let mut statement = conn.prepare(&sql).map_err(SqliteStoreError::from)?;
        let rows = statement
            .query_map([], Self::decode_cluster)
            .map_err(SqliteStoreError::from)?
            .collect::<Result<Vec<ClusterRecord>, _>>()
            .map_err(SqliteStoreError::from)?;
        Ok(rows)
    }

    fn settings(&self) -> Result<GatewaySettings, DirectoryError> {
        let conn = self.lock();
        let edit_mode_enabled = conn
            .query_row(
                "SELECT edit_mode_enabled FROM gateway_settings WHERE id = 1",
                [],
                |row| row.get::<_, bool>(0),
            )
            .optional()
            .map_err(SqliteStoreError::from)?
            .unwrap_or(false);
        Ok(GatewaySettings {
            edit_mode_enabled,
        })
    }
}

// ============================================================================
// SECTION: Audit Port
// ============================================================================

impl AuditStore for SqliteGatewayStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
        let timestamp = entry
            .timestamp
            .format(&Rfc3339)
            .map_err(|err| AuditStoreError::Invalid(err.to_string()))?;
        let request_body = entry
            .request_body
            .as_ref()
            .map(|body| serde_json::to_string(body))
            .transpose()
            .map_err(|err| AuditStoreError::Invalid(err.to_string()))?;
        let response_body = entry
            .response_body
            .as_ref()
            .map(|body| serde_json::to_string(body))
            .transpose()
            .map_err(|err| AuditStoreError::Invalid(err.to_string()))?;
        self.lock()
            .execute(
                "INSERT INTO audit_log (cluster_id, actor_id, actor_name, operation_name,
                 http_method, path, request_body, response_status, response_body,
                 error_message, client_ip, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    entry.cluster_id.map(ClusterId::get),
                    entry.actor_id.get(),
                    entry.actor_name,
                    entry.operation_name.as_str(),
                    entry.http_method.map(HttpMethod::as_str),
                    entry.path,
                    request_body,
                    entry.response_status,
                    response_body,
                    entry.error_message,
                    entry.client_ip,
                    timestamp,
                ],
            )
            .map_err(SqliteStoreError::from)?;
        Ok(())
    }

    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStoreError> {
        let mut sql = String::from(
            "SELECT cluster_id, actor_id, actor_name, operation_name, http_method, path,
             request_body, response_status, response_body, error_message, client_ip, timestamp
             FROM audit_log WHERE 1 = 1",
        );
        let mut bindings: Vec<SqlValue> = Vec::new();
        if let Some(cluster_id) = query.cluster_id {
            sql.push_str(" AND cluster_id = ?");
            bindings.push(SqlValue::Integer(cluster_id.get()));
        }
        if let Some(actor_id) = query.actor_id {
            sql.push_str(" AND actor_id = ?");
            bindings.push(SqlValue::Integer(actor_id.get()));
        }
        if let Some(operation) = &query.operation_name {
            sql.push_str(" AND operation_name = ?");
            bindings.push(SqlValue::Text(operation.as_str().to_string()));
        }
        if let Some(method) = query.http_method {
            sql.push_str(" AND http_method = ?");
            bindings.push(SqlValue::Text(method.as_str().to_string()));
        }
        if let Some(since) = query.since {
            sql.push_str(" AND timestamp >= ?");
            bindings.push(SqlValue::Text(
                since.format(&Rfc3339).map_err(|err| AuditStoreError::Invalid(err.to_string()))?,
            ));
        }
        if let Some(until) = query.until {
            sql.push_str(" AND timestamp <= ?");
            bindings.push(SqlValue::Text(
                until.format(&Rfc3339).map_err(|err| AuditStoreError::Invalid(err.to_string()))?,
            ));
        }
        if query.errors_only {
            sql.push_str(" AND error_message IS NOT NULL");
        }
        sql.push_str(" ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?");
        let limit = if query.limit == 0 { DEFAULT_QUERY_LIMIT } else { query.limit };
        bindings.push(SqlValue::Integer(limit as i64));
        bindings.push(SqlValue::Integer(query.offset as i64));

        let conn = self.lock();
        let mut statement = conn.prepare(&sql).map_err(SqliteStoreError::from)?;
        let rows = statement
            .query_map(params_from_iter(bindings), decode_audit_row)
            .map_err(SqliteStoreError::from)?
            .collect::<Result<Vec<AuditEntry>, _>>()
            .map_err(SqliteStoreError::from)?;
        Ok(rows)
    }

    fn statistics(&self) -> Result<AuditStatistics, AuditStoreError> {
        let conn = self.lock();
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(SqliteStoreError::from)?;
        let successes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM audit_log WHERE response_status BETWEEN 200 AND 299",
                [],
                |row| row.get(0),
            )
            .map_err(SqliteStoreError::from)?;
        let errors: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM audit_log WHERE error_message IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .map_err(SqliteStoreError::from)?;
        let mut statement = conn
            .prepare(
                "SELECT http_method, COUNT(*) FROM audit_log
                 WHERE http_method IS NOT NULL GROUP BY http_method ORDER BY http_method",
            )
            .map_err(SqliteStoreError::from)?;
        let by_method = statement
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?.unsigned_abs()))
            })
            .map_err(SqliteStoreError::from)?
            .collect::<Result<Vec<(String, u64)>, _>>()
            .map_err(SqliteStoreError::from)?;
        Ok(AuditStatistics {
            total: total.unsigned_abs(),
            by_method,
            successes: successes.unsigned_abs(),
            errors: errors.unsigned_abs(),
        })
    }
}

// ============================================================================
// SECTION: Row Decoding Helpers
// ============================================================================

/// Decodes one audit row into an [`AuditEntry`].
fn decode_audit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEntry> {
    let cluster_id = row.get::<_, Option<i64>>(0)?.and_then(ClusterId::from_raw);
    let raw_actor: i64 = row.get(1)?;
    let actor_id = ActorId::from_raw(raw_actor)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(1, raw_actor))?;
    let http_method =
        row.get::<_, Option<String>>(4)?.as_deref().and_then(HttpMethod::parse);
    let request_body = row
        .get::<_, Option<String>>(6)?
        .and_then(|text| serde_json::from_str(&text).ok());
    let response_body = row
        .get::<_, Option<String>>(8)?
        .and_then(|text| serde_json::from_str(&text).ok());
    let raw_timestamp: String = row.get(11)?;
    let timestamp = OffsetDateTime::parse(&raw_timestamp, &Rfc3339).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(err))
    })?;
    Ok(AuditEntry {
        cluster_id,
        actor_id,
        actor_name: row.get(2)?,
        operation_name: OperationName::new(row.get::<_, String>(3)?),
        http_method,
        path: row.get(5)?,
        request_body,
        response_status: row.get(7)?,
        response_body,
        error_message: row.get(9)?,
        client_ip: row.get(10)?,
        timestamp,
    })
}
