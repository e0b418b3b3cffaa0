// crates/chooser-portal-broker/src/emitter/channel.rs
// ============================================================================
// Module: Chooser Portal Channel Emitter
// Description: Channel-based emitter for asynchronous delivery.
// Purpose: Send terminal responses through a Tokio mpsc channel.
// Dependencies: chooser-portal-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelEmitter`] forwards terminal responses into an unbounded
//! `tokio::sync::mpsc` channel so emission never blocks a worker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use chooser_portal_core::EmitError;
use chooser_portal_core::Response;
use chooser_portal_core::ResponseEmitter;
use chooser_portal_core::ResponseTarget;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;

use crate::emitter::EmittedResponse;

// ============================================================================
// SECTION: Channel Emitter
// ============================================================================

/// Channel-based response emitter.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    /// Sender used to forward responses.
    sender: UnboundedSender<EmittedResponse>,
}

impl ChannelEmitter {
    /// Creates an emitter from an existing sender.
    #[must_use]
    pub const fn new(sender: UnboundedSender<EmittedResponse>) -> Self {
        Self {
            sender,
        }
    }

    /// Creates an emitter together with its receiving end.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<EmittedResponse>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl ResponseEmitter for ChannelEmitter {
    fn emit(&self, target: &ResponseTarget, response: Response) -> Result<(), EmitError> {
        self.sender
            .send(EmittedResponse {
                target: target.clone(),
                response,
            })
            .map_err(|_| EmitError::Closed)
    }
}
