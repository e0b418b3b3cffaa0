// crates/chooser-portal-core/src/error.rs
// ============================================================================
// Module: Chooser Portal Call Errors
// Description: Synchronous, caller-visible failures for portal calls.
// Purpose: Provide the error taxonomy returned in place of a request id.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`PortalError`] is returned synchronously when a call is rejected before a
//! request is accepted (or when a cancellation is refused). Failures that
//! happen after acceptance never surface here; they are folded into the single
//! terminal response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::BackendError;
use crate::validation::ValidationError;

// ============================================================================
// SECTION: Portal Errors
// ============================================================================

/// Errors returned synchronously by portal calls.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    /// Option payload is malformed; carries the full reason chain.
    #[error("{0}")]
    InvalidArgument(String),
    /// Backend call handle could not be created.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Caller may not act on the referenced request.
    #[error("not allowed: {0}")]
    NotAllowed(String),
}

impl PortalError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::NotAllowed(_) => "not_allowed",
        }
    }
}

impl From<ValidationError> for PortalError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.reason().to_string())
    }
}

impl From<BackendError> for PortalError {
    fn from(err: BackendError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}
