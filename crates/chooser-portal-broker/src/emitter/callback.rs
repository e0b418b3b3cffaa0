// crates/chooser-portal-broker/src/emitter/callback.rs
// ============================================================================
// Module: Chooser Portal Callback Emitter
// Description: Closure-based emitter for in-process delivery.
// Purpose: Hand terminal responses to a caller-supplied handler.
// Dependencies: chooser-portal-core
// ============================================================================

//! ## Overview
//! [`CallbackEmitter`] invokes a handler for every terminal response. The
//! handler runs on a response worker thread after the request has
//! terminated, with no portal lock held, so it may call back into the portal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use chooser_portal_core::EmitError;
use chooser_portal_core::Response;
use chooser_portal_core::ResponseEmitter;
use chooser_portal_core::ResponseTarget;

// ============================================================================
// SECTION: Callback Emitter
// ============================================================================

/// Callback-based response emitter.
#[derive(Clone)]
pub struct CallbackEmitter {
    /// Handler invoked with the target and response.
    handler: Arc<CallbackHandler>,
}

/// Callback handler signature used by the emitter.
type CallbackHandler = dyn Fn(&ResponseTarget, Response) -> Result<(), EmitError> + Send + Sync;

impl CallbackEmitter {
    /// Creates a callback emitter from a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ResponseTarget, Response) -> Result<(), EmitError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl ResponseEmitter for CallbackEmitter {
    fn emit(&self, target: &ResponseTarget, response: Response) -> Result<(), EmitError> {
        (self.handler)(target, response)
    }
}
