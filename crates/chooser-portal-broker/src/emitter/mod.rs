// crates/chooser-portal-broker/src/emitter/mod.rs
// ============================================================================
// Module: Chooser Portal Response Emitters
// Description: Reference implementations of terminal response delivery.
// Purpose: Deliver terminal responses to callers or test harnesses.
// Dependencies: chooser-portal-core, tokio, tracing
// ============================================================================

//! ## Overview
//! Emitters implement [`chooser_portal_core::ResponseEmitter`]. A transport
//! adapter would send the response signal to the caller; the reference
//! emitters here forward into a channel, a closure, or the log.
//! Invariants:
//! - Each successful emission delivers exactly one [`EmittedResponse`] or
//!   callback invocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chooser_portal_core::Response;
use chooser_portal_core::ResponseTarget;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod callback;
mod channel;
mod log;

pub use callback::CallbackEmitter;
pub use channel::ChannelEmitter;
pub use log::LogEmitter;

// ============================================================================
// SECTION: Emitted Response
// ============================================================================

/// Terminal response paired with its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedResponse {
    /// Request and caller the response belongs to.
    pub target: ResponseTarget,
    /// Response payload.
    pub response: Response,
}
