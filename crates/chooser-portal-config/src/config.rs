// crates/chooser-portal-config/src/config.rs
// ============================================================================
// Module: Chooser Portal Configuration
// Description: Configuration loading and validation for the file chooser portal.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional; omitted fields take documented defaults.
//! Invalid configuration fails closed.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "chooser-portal.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "CHOOSER_PORTAL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default object path prefix for request handles.
pub const DEFAULT_REQUEST_PATH_PREFIX: &str = "/org/freedesktop/portal/desktop/request";
/// Default document store mount point.
pub const DEFAULT_DOCUMENT_MOUNT_POINT: &str = "/run/user/1000/doc";
/// Default number of concurrent response workers.
pub const DEFAULT_MAX_RESPONSE_WORKERS: usize = 8;
/// Maximum number of concurrent response workers.
pub(crate) const MAX_RESPONSE_WORKERS: usize = 256;
/// Maximum backend call timeout in milliseconds (24 hours).
pub(crate) const MAX_CALL_TIMEOUT_MS: u64 = 86_400_000;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for the file chooser portal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChooserPortalConfig {
    /// Request handle configuration.
    #[serde(default)]
    pub requests: RequestsConfig,
    /// Backend call configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Response pipeline configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Reference document store configuration.
    #[serde(default)]
    pub documents: DocumentsConfig,
}

impl ChooserPortalConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.requests.validate()?;
        self.backend.validate()?;
        self.pipeline.validate()?;
        self.documents.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Request handle configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestsConfig {
    /// Object path prefix under which request handles are exported.
    #[serde(default = "default_request_path_prefix")]
    pub path_prefix: String,
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_request_path_prefix(),
        }
    }
}

impl RequestsConfig {
    /// Validates request handle configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_request_path_prefix(&self.path_prefix)
    }
}

/// Validates an object path prefix for request handles.
///
/// The prefix must be absolute, must not end with `/` (so `/` alone is
/// rejected), and every element must match `[A-Za-z0-9_]+`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `prefix` is not a usable prefix.
pub fn validate_request_path_prefix(prefix: &str) -> Result<(), ConfigError> {
    validate_absolute_path("requests.path_prefix", prefix)?;
    if prefix.ends_with('/') {
        return Err(ConfigError::Invalid(
            "requests.path_prefix must not end with '/'".to_string(),
        ));
    }
    let valid_chars = prefix
        .bytes()
        .all(|byte| byte == b'/' || byte == b'_' || byte.is_ascii_alphanumeric());
    if !valid_chars || prefix.contains("//") {
        return Err(ConfigError::Invalid(
            "requests.path_prefix must be a valid object path".to_string(),
        ));
    }
    Ok(())
}

/// Backend call configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Optional per-call timeout in milliseconds; absent means unbounded.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

impl BackendConfig {
    /// Returns the configured call timeout, if any.
    #[must_use]
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// Validates backend configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.call_timeout_ms
            && (timeout == 0 || timeout > MAX_CALL_TIMEOUT_MS)
        {
            return Err(ConfigError::Invalid("backend.call_timeout_ms out of range".to_string()));
        }
        Ok(())
    }
}

/// Response pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Maximum number of translation stages running concurrently.
    #[serde(default = "default_max_response_workers")]
    pub max_response_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_response_workers: default_max_response_workers(),
        }
    }
}

impl PipelineConfig {
    /// Validates pipeline configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_response_workers == 0 || self.max_response_workers > MAX_RESPONSE_WORKERS {
            return Err(ConfigError::Invalid(
                "pipeline.max_response_workers out of range".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reference document store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentsConfig {
    /// Mount point under which registered documents are exposed.
    #[serde(default = "default_document_mount_point")]
    pub mount_point: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            mount_point: default_document_mount_point(),
        }
    }
}

impl DocumentsConfig {
    /// Validates document store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_absolute_path("documents.mount_point", &self.mount_point)
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default request path prefix.
fn default_request_path_prefix() -> String {
    DEFAULT_REQUEST_PATH_PREFIX.to_string()
}

/// Returns the default response worker bound.
const fn default_max_response_workers() -> usize {
    DEFAULT_MAX_RESPONSE_WORKERS
}

/// Returns the default document mount point.
fn default_document_mount_point() -> String {
    DEFAULT_DOCUMENT_MOUNT_POINT.to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates that `value` is a non-empty absolute path within length limits.
fn validate_absolute_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if !value.starts_with('/') {
        return Err(ConfigError::Invalid(format!("{field} must be absolute")));
    }
    if value.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.split('/').any(|component| component.len() > MAX_PATH_COMPONENT_LENGTH) {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}
