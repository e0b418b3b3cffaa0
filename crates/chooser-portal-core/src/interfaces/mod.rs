// crates/chooser-portal-core/src/interfaces/mod.rs
// ============================================================================
// Module: Chooser Portal Interfaces
// Description: Collaborator contracts for backends, registration, and responses.
// Purpose: Define the seams between the mediator and external services.
// Dependencies: crate::core, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! The mediator talks to three external collaborators, all reached through
//! trait objects constructed once per process:
//! - [`FileChooserBackend`]: the privileged, out-of-process implementation
//!   that shows the dialog.
//! - [`DocumentRegistry`]: turns a raw file URI into a sandbox-visible one.
//! - [`ResponseEmitter`]: delivers the terminal response to the caller.
//!
//! Security posture: backend results and caller payloads are untrusted input;
//! implementations must not assume they were validated beyond the declared
//! schema.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::AppId;
use crate::core::identifiers::RequestId;
use crate::core::variant::VarDict;

// ============================================================================
// SECTION: Response Codes
// ============================================================================

/// Response code carried by backend answers and terminal responses.
///
/// # Invariants
/// - `0` is success; every other value is a cancellation or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseCode(u32);

impl ResponseCode {
    /// The user completed the interaction.
    pub const SUCCESS: Self = Self(0);
    /// The user cancelled the interaction.
    pub const CANCELLED: Self = Self(1);
    /// The interaction ended some other way, including backend failures.
    pub const OTHER: Self = Self(2);

    /// Creates a response code from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true for the success code.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Backend errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend could not be reached to set up the call.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Backend call returned no usable answer.
    #[error("backend communication failed: {0}")]
    Communication(String),
    /// Backend call exceeded the configured timeout.
    #[error("backend call timed out after {0} ms")]
    Timeout(u64),
}

/// Call forwarded to the backend.
///
/// # Invariants
/// - `options` contains only schema-allowed, correctly typed entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    /// Request identifier the backend should associate with the dialog.
    pub request_id: RequestId,
    /// Application identifier of the caller.
    pub app_id: AppId,
    /// Caller-supplied parent window handle.
    pub parent_window: String,
    /// Dialog title.
    pub title: String,
    /// Filtered options.
    pub options: VarDict,
}

/// Terminal answer returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// Response code.
    pub code: ResponseCode,
    /// Result dictionary (`uris`, `writable`, `choices`, ...).
    pub results: VarDict,
}

impl BackendResponse {
    /// Creates a backend response.
    #[must_use]
    pub const fn new(code: ResponseCode, results: VarDict) -> Self {
        Self {
            code,
            results,
        }
    }
}

/// Backend-side handle for one in-flight request.
///
/// Held by the request only so cancellation can reach the backend; dropping
/// it never aborts the backend call.
pub trait BackendRequestHandle: Send + Sync {
    /// Asks the backend to dismiss the request.
    ///
    /// The default implementation does nothing for backends without a
    /// cancellation primitive.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the close call fails.
    fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Privileged file chooser implementation.
#[async_trait]
pub trait FileChooserBackend: Send + Sync {
    /// Creates the backend handle for a new request.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the backend cannot be reached.
    fn create_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Arc<dyn BackendRequestHandle>, BackendError>;

    /// Shows an open dialog and resolves once the user is done.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when no answer can be obtained.
    async fn open_file(&self, call: BackendCall) -> Result<BackendResponse, BackendError>;

    /// Shows a save dialog and resolves once the user is done.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when no answer can be obtained.
    async fn save_file(&self, call: BackendCall) -> Result<BackendResponse, BackendError>;
}

// ============================================================================
// SECTION: Document Registration
// ============================================================================

/// Document registration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// URI could not be parsed.
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// URI scheme cannot be exported to the sandbox.
    #[error("unsupported uri scheme: {0}")]
    UnsupportedScheme(String),
    /// Registration service rejected the document.
    #[error("registration failed: {0}")]
    Failed(String),
}

/// Service converting raw file references into sandbox-visible ones.
///
/// Implementations may block on I/O; the mediator only calls them from its
/// background workers.
pub trait DocumentRegistry: Send + Sync {
    /// Registers `uri` for `app_id` and returns the translated reference.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when this URI cannot be registered.
    fn register(
        &self,
        uri: &str,
        app_id: &AppId,
        for_save: bool,
        writable: bool,
    ) -> Result<String, RegistrationError>;
}

// ============================================================================
// SECTION: Response Emission
// ============================================================================

/// Terminal response delivered to the original caller.
///
/// # Invariants
/// - `results` always contains `uris`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response code.
    pub code: ResponseCode,
    /// Result dictionary.
    pub results: VarDict,
}

/// Addressing for a terminal response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseTarget {
    /// Request the response belongs to.
    pub request_id: RequestId,
    /// Transport address of the caller.
    pub sender: String,
}

/// Emitter errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// Receiving side is gone.
    #[error("response channel closed")]
    Closed,
    /// Delivery failed.
    #[error("response delivery failed: {0}")]
    Failed(String),
}

/// Transport-side delivery of terminal responses.
pub trait ResponseEmitter: Send + Sync {
    /// Delivers `response` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError`] when delivery fails.
    fn emit(&self, target: &ResponseTarget, response: Response) -> Result<(), EmitError>;
}
