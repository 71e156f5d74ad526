// crates/fabric-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Fabric Gate Identifiers
// Description: Canonical opaque identifiers for gateway records and operations.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Fabric Gate.
//! Numeric identifiers mirror database primary keys and enforce non-zero,
//! 1-based invariants at construction boundaries. [`OperationName`] is the
//! RBAC unit and audit key and applies the tool-name length cap at
//! construction so every downstream consumer sees the same name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroI64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum byte length of an operation name exposed as a callable tool.
pub const MAX_OPERATION_NAME_BYTES: usize = 64;

// ============================================================================
// SECTION: Numeric Identifiers
// ============================================================================

/// Cluster identifier for a managed backend target.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based, matching the storage primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(NonZeroI64);

impl ClusterId {
    /// Creates a new cluster identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroI64) -> Self {
        Self(id)
    }

    /// Creates a cluster identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        NonZeroI64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Actor identifier for an authenticated caller.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based, matching the storage primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(NonZeroI64);

impl ActorId {
    /// Creates a new actor identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroI64) -> Self {
        Self(id)
    }

    /// Creates an actor identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        NonZeroI64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Role identifier for an RBAC role record.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based, matching the storage primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(NonZeroI64);

impl RoleId {
    /// Creates a new role identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroI64) -> Self {
        Self(id)
    }

    /// Creates a role identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        NonZeroI64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: API Families
// ============================================================================

/// Backend API group an operation belongs to.
///
/// # Invariants
/// - The set is fixed; labels and base paths are stable wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFamily {
    /// Fabric controller: switches, networks, VRFs, policies, templates.
    Manage,
    /// Network insights: flow analytics, anomalies, compliance, advisories.
    Analyze,
    /// Platform infrastructure: nodes, services, system health, backups.
    Infra,
    /// Multi-site orchestration.
    OneManage,
}

impl ApiFamily {
    /// Returns the stable lowercase label for the family.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manage => "manage",
            Self::Analyze => "analyze",
            Self::Infra => "infra",
            Self::OneManage => "onemanage",
        }
    }

    /// Returns the URL base path prepended to relative operation paths.
    #[must_use]
    pub const fn base_path(self) -> &'static str {
        match self {
            Self::Manage => "/api/v1/manage",
            Self::Analyze => "/api/v1/analyze",
            Self::Infra => "/api/v1/infra",
            Self::OneManage => "/api/v1/oneManage",
        }
    }

    /// Parses a family from its stable label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "manage" => Some(Self::Manage),
            "analyze" => Some(Self::Analyze),
            "infra" => Some(Self::Infra),
            "onemanage" => Some(Self::OneManage),
            _ => None,
        }
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Operation Names
// ============================================================================

/// Globally unique operation name, used as the RBAC unit and audit key.
///
/// # Invariants
/// - Never longer than [`MAX_OPERATION_NAME_BYTES`].
/// - Stable across restarts for a given API description set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(String);

impl OperationName {
    /// Creates an operation name from an already-canonical string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derives the canonical name for an operation within an API family.
    ///
    /// The preferred form is `{family}_{operation_id}`; when that exceeds the
    /// tool-name cap the bare operation id is used instead, truncated at a
    /// character boundary within the cap.
    #[must_use]
    pub fn from_parts(family: ApiFamily, operation_id: &str) -> Self {
        let prefixed = format!("{}_{operation_id}", family.as_str());
        if prefixed.len() <= MAX_OPERATION_NAME_BYTES {
            return Self(prefixed);
        }
        let mut bare = operation_id.to_string();
        while bare.len() > MAX_OPERATION_NAME_BYTES {
            bare.pop();
        }
        Self(bare)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OperationName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OperationName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
