// crates/chooser-portal-broker/src/emitter/log.rs
// ============================================================================
// Module: Chooser Portal Log Emitter
// Description: Emitter that records terminal responses in the log.
// Purpose: Provide an observable default when no transport is attached.
// Dependencies: chooser-portal-core, tracing
// ============================================================================

//! ## Overview
//! [`LogEmitter`] records each terminal response as a `tracing` event with
//! the request id, caller, response code, and URI count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chooser_portal_core::EmitError;
use chooser_portal_core::Response;
use chooser_portal_core::ResponseEmitter;
use chooser_portal_core::ResponseTarget;
use chooser_portal_core::Variant;

// ============================================================================
// SECTION: Log Emitter
// ============================================================================

/// Response emitter writing to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl LogEmitter {
    /// Creates a log emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ResponseEmitter for LogEmitter {
    fn emit(&self, target: &ResponseTarget, response: Response) -> Result<(), EmitError> {
        let uris = match response.results.get("uris") {
            Some(Variant::Array(array)) => array.len(),
            _ => 0,
        };
        tracing::info!(
            request_id = %target.request_id,
            sender = %target.sender,
            code = response.code.get(),
            uris,
            "file chooser response"
        );
        Ok(())
    }
}
