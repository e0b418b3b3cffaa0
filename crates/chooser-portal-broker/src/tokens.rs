// crates/chooser-portal-broker/src/tokens.rs
// ============================================================================
// Module: Chooser Portal Request Paths
// Description: Request identifier construction from caller address and token.
// Purpose: Produce stable, collision-resistant request object paths.
// Dependencies: chooser-portal-core, rand
// ============================================================================

//! ## Overview
//! Request identifiers are object paths of the form
//! `{prefix}/{escaped_sender}/{token}`. The sender address is escaped into a
//! valid path element by dropping a leading `:` and mapping `.` to `_`. The
//! token is either the caller's `handle_token` option or a random `t{n}`.
//! Invariants:
//! - Every produced path element matches `[A-Za-z0-9_]+`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chooser_portal_core::PortalError;
use chooser_portal_core::RequestId;
use chooser_portal_core::VarDict;
use chooser_portal_core::Variant;
use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Option key carrying the caller-chosen request token.
pub const HANDLE_TOKEN_KEY: &str = "handle_token";
/// Maximum accepted length of a caller-chosen token.
const MAX_HANDLE_TOKEN_LENGTH: usize = 255;

// ============================================================================
// SECTION: Request Paths
// ============================================================================

/// Builds request identifiers under a fixed object path prefix.
#[derive(Debug, Clone)]
pub struct RequestPaths {
    /// Absolute path prefix without a trailing slash.
    prefix: String,
}

impl RequestPaths {
    /// Creates a path builder for `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the request id for `sender` and `token`.
    #[must_use]
    pub fn request_id(&self, sender: &str, token: &str) -> RequestId {
        RequestId::new(format!("{}/{}/{token}", self.prefix, escape_sender(sender)))
    }

    /// Returns a request id with a freshly drawn random token.
    #[must_use]
    pub fn random_request_id(&self, sender: &str) -> RequestId {
        self.request_id(sender, &random_token())
    }
}

/// Reads and checks the `handle_token` option.
///
/// Returns `Ok(None)` when the option is absent or not a string.
///
/// # Errors
///
/// Returns [`PortalError::InvalidArgument`] when the token is empty, too long,
/// or contains characters outside `[A-Za-z0-9_]`.
pub fn handle_token(options: &VarDict) -> Result<Option<String>, PortalError> {
    let Some(Variant::Str(token)) = options.get(HANDLE_TOKEN_KEY) else {
        return Ok(None);
    };
    if !is_valid_path_element(token) || token.len() > MAX_HANDLE_TOKEN_LENGTH {
        return Err(PortalError::InvalidArgument(format!("invalid handle_token: {token}")));
    }
    Ok(Some(token.clone()))
}

/// Escapes a transport sender address into an object path element.
#[must_use]
pub fn escape_sender(sender: &str) -> String {
    let trimmed = sender.strip_prefix(':').unwrap_or(sender);
    let escaped: String = trimmed
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    if escaped.is_empty() { "_".to_string() } else { escaped }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `value` is a non-empty `[A-Za-z0-9_]` string.
fn is_valid_path_element(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte == b'_' || byte.is_ascii_alphanumeric())
}

/// Draws a random `t{n}` token.
fn random_token() -> String {
    format!("t{}", OsRng.next_u32())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
