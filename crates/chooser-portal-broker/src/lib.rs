// crates/chooser-portal-broker/src/lib.rs
// ============================================================================
// Module: Chooser Portal Broker Library
// Description: Request lifecycle, invocation pipeline, and reference collaborators.
// Purpose: Mediate file chooser calls between sandboxed callers and a backend.
// Dependencies: chooser-portal-config, chooser-portal-core, rand, tokio, tracing, url
// ============================================================================

//! ## Overview
//! The broker crate wires the core model into a running mediator:
//! [`FileChooserPortal`] owns the request table and drives the two-stage
//! response pipeline on a tokio runtime. Reference emitters and the in-memory
//! [`DocumentStore`] cover the outbound seams for embedding and tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod documents;
pub mod emitter;
pub mod portal;
pub mod registry;
pub mod request;
pub mod tokens;
pub mod workers;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use documents::DocumentGrant;
pub use documents::DocumentStore;
pub use emitter::CallbackEmitter;
pub use emitter::ChannelEmitter;
pub use emitter::EmittedResponse;
pub use emitter::LogEmitter;
pub use portal::FileChooserPortal;
pub use portal::FileChooserPortalBuilder;
pub use portal::PortalBuildError;
pub use registry::RequestRegistry;
pub use request::Request;
pub use request::RequestKind;
pub use request::RequestPhase;
pub use tokens::RequestPaths;
pub use workers::ActivityTracker;
pub use workers::ResponseWorkers;
