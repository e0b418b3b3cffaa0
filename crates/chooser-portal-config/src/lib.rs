// crates/chooser-portal-config/src/lib.rs
// ============================================================================
// Module: Chooser Portal Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for chooser-portal.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `chooser-portal-config` defines the configuration model for the file
//! chooser portal: request handle naming, backend call timeouts, the response
//! worker bound, and the reference document store mount point. It provides
//! strict, fail-closed validation.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::BackendConfig;
pub use config::ChooserPortalConfig;
pub use config::ConfigError;
pub use config::DEFAULT_DOCUMENT_MOUNT_POINT;
pub use config::DEFAULT_MAX_RESPONSE_WORKERS;
pub use config::DEFAULT_REQUEST_PATH_PREFIX;
pub use config::DocumentsConfig;
pub use config::PipelineConfig;
pub use config::RequestsConfig;
pub use config::validate_request_path_prefix;
