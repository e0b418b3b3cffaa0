// crates/chooser-portal-core/src/lib.rs
// ============================================================================
// Module: Chooser Portal Core Library
// Description: Value model, option schemas, validators, and collaborator traits.
// Purpose: Provide the backend-agnostic core of the file chooser mediator.
// Dependencies: async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! `chooser-portal-core` holds everything the file chooser mediator needs
//! before it touches a runtime: the typed [`Variant`] model for option
//! payloads, the per-operation [`OptionSchema`] allow-lists and
//! [`filter_options`] projection, the structural validators for `filters` and
//! `choices`, the [`PortalError`] taxonomy, and the collaborator traits
//! ([`FileChooserBackend`], [`DocumentRegistry`], [`ResponseEmitter`]).
//! Invariants:
//! - Schema filtering never fails; validation fails fast with a reason chain.
//!
//! Security posture: caller payloads and backend answers are untrusted input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod error;
pub mod interfaces;
pub mod schema;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;
pub use error::PortalError;
pub use interfaces::BackendCall;
pub use interfaces::BackendError;
pub use interfaces::BackendRequestHandle;
pub use interfaces::BackendResponse;
pub use interfaces::DocumentRegistry;
pub use interfaces::EmitError;
pub use interfaces::FileChooserBackend;
pub use interfaces::RegistrationError;
pub use interfaces::Response;
pub use interfaces::ResponseCode;
pub use interfaces::ResponseEmitter;
pub use interfaces::ResponseTarget;
pub use schema::OptionKey;
pub use schema::OptionSchema;
pub use schema::filter_options;
pub use schema::open_file_schema;
pub use schema::save_file_schema;
pub use validation::ValidationError;
pub use validation::validate_choices;
pub use validation::validate_filters;
