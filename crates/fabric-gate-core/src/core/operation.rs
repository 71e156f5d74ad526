// crates/fabric-gate-core/src/core/operation.rs
// ============================================================================
// Module: Operation Descriptors
// Description: Immutable records describing one callable backend operation.
// Purpose: Carry method, path template, and write-mode classification.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`OperationDescriptor`] identifies one backend REST operation exposed
//! as a callable tool. Descriptors are built once per registry load from the
//! API descriptions and are never mutated per request. The write-mode
//! classification is derived from the HTTP method so the policy engine and
//! the registry can never disagree about which operations are write-shaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ApiFamily;
use crate::core::identifiers::OperationName;

// ============================================================================
// SECTION: HTTP Methods
// ============================================================================

/// HTTP method for a backend operation.
///
/// # Invariants
/// - Labels are stable uppercase wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
    /// HTTP PATCH.
    Patch,
    /// HTTP HEAD.
    Head,
    /// HTTP OPTIONS.
    Options,
}

impl HttpMethod {
    /// Returns the stable uppercase label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Parses a method label case-insensitively.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Returns true for create/update/delete-shaped methods.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Delete | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Path Templates
// ============================================================================

/// URL path template with `{name}` placeholders.
///
/// # Invariants
/// - Stored verbatim; placeholder extraction is a pure read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Creates a path template from its raw string form.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the placeholder names in order of appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            names.push(&rest[open + 1..open + close]);
            rest = &rest[open + close + 1..];
        }
        names
    }

    /// Substitutes placeholders from the provided values.
    ///
    /// # Errors
    ///
    /// Returns the first placeholder name with no corresponding value.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, String> {
        let mut rendered = self.0.clone();
        for name in self.placeholders() {
            let Some(value) = values.get(name) else {
                return Err(name.to_string());
            };
            rendered = rendered.replace(&format!("{{{name}}}"), value);
        }
        Ok(rendered)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Operation Descriptor
// ============================================================================

/// Immutable description of one callable backend operation.
///
/// # Invariants
/// - `name` is globally unique within a registry snapshot.
/// - `requires_write_mode` equals `http_method.is_write()`.
/// - Never mutated after the snapshot containing it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Globally unique operation name (RBAC unit and audit key).
    pub name: OperationName,
    /// Backend API group the operation belongs to.
    pub api_family: ApiFamily,
    /// HTTP method used for dispatch.
    pub http_method: HttpMethod,
    /// Path template with named placeholders.
    pub path_template: PathTemplate,
    /// True for create/update/delete-shaped operations.
    pub requires_write_mode: bool,
    /// Short summary from the API description.
    pub summary: String,
    /// Base description text (may be overridden by guidance).
    pub description: String,
    /// Query parameter names accepted by the operation.
    pub query_parameters: Vec<String>,
    /// True when the operation accepts a JSON request body.
    pub accepts_body: bool,
}

impl OperationDescriptor {
    /// Returns the effective backend path for this operation.
    ///
    /// Relative templates are prefixed with the family base path; templates
    /// already rooted under `/api/` are used verbatim.
    #[must_use]
    pub fn backend_path(&self, rendered: &str) -> String {
        if rendered.starts_with("/api/") {
            rendered.to_string()
        } else {
            format!("{}{rendered}", self.api_family.base_path())
        }
    }
}
