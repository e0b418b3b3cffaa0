//! Config validation tests for chooser-portal-config.
// crates/chooser-portal-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate defaults, section parsing, and range limits.
// Purpose: Ensure config handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chooser_portal_config::ChooserPortalConfig;
use chooser_portal_config::ConfigError;
use chooser_portal_config::DEFAULT_MAX_RESPONSE_WORKERS;
use chooser_portal_config::DEFAULT_DOCUMENT_MOUNT_POINT;
use chooser_portal_config::DEFAULT_REQUEST_PATH_PREFIX;
use chooser_portal_config::validate_request_path_prefix;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

/// Assert that a config result is an error containing a specific substring.
fn assert_invalid(result: Result<ChooserPortalConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Tests that an empty document yields every documented default.
#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = ChooserPortalConfig::from_toml_str("").map_err(|err| err.to_string())?;
    if config.requests.path_prefix != DEFAULT_REQUEST_PATH_PREFIX {
        return Err(format!("unexpected path prefix {}", config.requests.path_prefix));
    }
    if config.backend.call_timeout().is_some() {
        return Err("default call timeout should be unbounded".to_string());
    }
    if config.pipeline.max_response_workers != DEFAULT_MAX_RESPONSE_WORKERS {
        return Err("default worker bound should be 8".to_string());
    }
    if config.documents.mount_point != DEFAULT_DOCUMENT_MOUNT_POINT {
        return Err("unexpected default mount point".to_string());
    }
    Ok(())
}

/// Tests that the programmatic default passes validation.
#[test]
fn default_config_validates() -> TestResult {
    ChooserPortalConfig::default().validate().map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Tests that every section is parsed.
#[test]
fn parses_all_sections() -> TestResult {
    let config = ChooserPortalConfig::from_toml_str(
        r#"
[requests]
path_prefix = "/com/example/portal/request"

[backend]
call_timeout_ms = 30000

[pipeline]
max_response_workers = 2

[documents]
mount_point = "/tmp/doc"
"#,
    )
    .map_err(|err| err.to_string())?;
    if config.requests.path_prefix != "/com/example/portal/request" {
        return Err("path prefix not parsed".to_string());
    }
    if config.backend.call_timeout() != Some(Duration::from_secs(30)) {
        return Err("call timeout not parsed".to_string());
    }
    if config.pipeline.max_response_workers != 2 {
        return Err("worker bound not parsed".to_string());
    }
    if config.documents.mount_point != "/tmp/doc" {
        return Err("mount point not parsed".to_string());
    }
    Ok(())
}

/// Tests that unknown keys are rejected at parse time.
#[test]
fn rejects_unknown_fields() -> TestResult {
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[pipeline]\nworkers = 2\n"),
        "config parse error",
    )
}

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Tests request path prefix constraints.
#[test]
fn rejects_invalid_path_prefix() -> TestResult {
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[requests]\npath_prefix = \"relative/path\"\n"),
        "requests.path_prefix must be absolute",
    )?;
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[requests]\npath_prefix = \"/a/b/\"\n"),
        "must not end with '/'",
    )?;
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[requests]\npath_prefix = \"/a-b\"\n"),
        "must be a valid object path",
    )?;
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[requests]\npath_prefix = \"\"\n"),
        "requests.path_prefix must be non-empty",
    )
}

/// Tests that the root path cannot serve as a request prefix.
#[test]
fn rejects_root_path_prefix() -> TestResult {
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[requests]\npath_prefix = \"/\"\n"),
        "requests.path_prefix must not end with '/'",
    )?;
    if validate_request_path_prefix("/").is_ok() {
        return Err("root prefix accepted".to_string());
    }
    validate_request_path_prefix("/a").map_err(|err| err.to_string())
}

/// Tests call timeout bounds.
#[test]
fn rejects_call_timeout_out_of_range() -> TestResult {
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[backend]\ncall_timeout_ms = 0\n"),
        "backend.call_timeout_ms out of range",
    )?;
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[backend]\ncall_timeout_ms = 86400001\n"),
        "backend.call_timeout_ms out of range",
    )?;
    ChooserPortalConfig::from_toml_str("[backend]\ncall_timeout_ms = 86400000\n")
        .map(|_| ())
        .map_err(|err| err.to_string())
}

/// Tests worker bound limits.
#[test]
fn rejects_worker_bound_out_of_range() -> TestResult {
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[pipeline]\nmax_response_workers = 0\n"),
        "pipeline.max_response_workers out of range",
    )?;
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[pipeline]\nmax_response_workers = 257\n"),
        "pipeline.max_response_workers out of range",
    )
}

/// Tests that the mount point must be absolute.
#[test]
fn rejects_relative_mount_point() -> TestResult {
    assert_invalid(
        ChooserPortalConfig::from_toml_str("[documents]\nmount_point = \"doc\"\n"),
        "documents.mount_point must be absolute",
    )
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Tests loading a valid file from disk.
#[test]
fn load_reads_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[pipeline]\nmax_response_workers = 4\n").map_err(|err| err.to_string())?;
    let config = ChooserPortalConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.pipeline.max_response_workers != 4 {
        return Err("file contents not applied".to_string());
    }
    Ok(())
}

/// Tests that a missing file is an I/O error.
#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(ChooserPortalConfig::load(Some(&path)), "config io error")
}

/// Tests the total path length guard.
#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(
        ChooserPortalConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

/// Tests the path component length guard.
#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        ChooserPortalConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

/// Tests the file size guard.
#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 64 * 1024 + 1];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(ChooserPortalConfig::load(Some(file.path())), "config file exceeds size limit")
}

/// Tests the UTF-8 guard.
#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(ChooserPortalConfig::load(Some(file.path())), "config file must be utf-8")
}
