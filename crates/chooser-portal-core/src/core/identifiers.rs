// crates/chooser-portal-core/src/core/identifiers.rs
// ============================================================================
// Module: Chooser Portal Identifiers
// Description: Opaque identifiers for mediated requests and their callers.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers used throughout the portal. Request identifiers are transport
//! object paths; application identifiers arrive from the transport layer and
//! may be empty for unsandboxed (host) callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of one in-flight mediated request.
///
/// # Invariants
/// - Opaque UTF-8 string; doubles as the export path on the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a new request identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Application identifier of the sandboxed caller.
///
/// # Invariants
/// - Empty for host (unsandboxed) callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Creates a new application identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the caller is not sandboxed.
    #[must_use]
    pub const fn is_host(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Caller identity supplied by the transport for each inbound call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerContext {
    /// Transport-level address of the caller (for example `:1.42`).
    pub sender: String,
    /// Application identifier resolved for the sender.
    pub app_id: AppId,
}

impl CallerContext {
    /// Creates a caller context.
    #[must_use]
    pub fn new(sender: impl Into<String>, app_id: impl Into<AppId>) -> Self {
        Self {
            sender: sender.into(),
            app_id: app_id.into(),
        }
    }
}
