// crates/chooser-portal-broker/src/documents.rs
// ============================================================================
// Module: Chooser Portal Document Store
// Description: In-memory reference implementation of document registration.
// Purpose: Translate file URIs into sandbox-visible references with grants.
// Dependencies: chooser-portal-config, chooser-portal-core, url, tracing
// ============================================================================

//! ## Overview
//! [`DocumentStore`] assigns each exported file path a stable document id and
//! exposes it as `file://{mount_point}/{doc_id}/{basename}`. Every
//! registration records a per-application grant: read always, write when the
//! caller was told the file is writable. Host applications (empty app id) see
//! the original URI unchanged and receive no grant.
//! Invariants:
//! - The same path always maps to the same document id.
//! - Grants only widen; a later read-only registration never revokes write.
//!
//! Security posture: URIs come from the backend and are untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use chooser_portal_config::DocumentsConfig;
use chooser_portal_core::AppId;
use chooser_portal_core::DocumentRegistry;
use chooser_portal_core::RegistrationError;
use url::Url;

// ============================================================================
// SECTION: Grants
// ============================================================================

/// Access granted to one application for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentGrant {
    /// Application may read the document.
    pub read: bool,
    /// Application may write the document.
    pub write: bool,
}

/// Mutable store state.
#[derive(Debug, Default)]
struct StoreState {
    /// Document id per exported path.
    ids: BTreeMap<PathBuf, String>,
    /// Grants keyed by document id and application.
    grants: BTreeMap<(String, AppId), DocumentGrant>,
    /// Next document sequence number.
    next_seq: u64,
}

// ============================================================================
// SECTION: Document Store
// ============================================================================

/// In-memory document registry.
#[derive(Debug)]
pub struct DocumentStore {
    /// Mount point under which documents are exposed.
    mount_point: PathBuf,
    /// Guarded store state.
    state: Mutex<StoreState>,
}

impl DocumentStore {
    /// Creates a store exposing documents under `mount_point`.
    #[must_use]
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self {
            mount_point: mount_point.into(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Creates a store from the `[documents]` config section.
    #[must_use]
    pub fn from_config(config: &DocumentsConfig) -> Self {
        Self::new(config.mount_point.as_str())
    }

    /// Returns the mount point.
    #[must_use]
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Returns the document id assigned to `path`, if any.
    #[must_use]
    pub fn document_id(&self, path: &Path) -> Option<String> {
        self.lock().ids.get(path).cloned()
    }

    /// Returns the grant held by `app_id` on `doc_id`.
    #[must_use]
    pub fn grant(&self, doc_id: &str, app_id: &AppId) -> Option<DocumentGrant> {
        self.lock().grants.get(&(doc_id.to_string(), app_id.clone())).copied()
    }

    /// Returns the number of exported documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().ids.len()
    }

    /// Returns true when no document has been exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().ids.is_empty()
    }

    /// Acquires the state lock, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentRegistry for DocumentStore {
    fn register(
        &self,
        uri: &str,
        app_id: &AppId,
        for_save: bool,
        writable: bool,
    ) -> Result<String, RegistrationError> {
        if app_id.is_host() {
            return Ok(uri.to_string());
        }
        let parsed = Url::parse(uri).map_err(|err| RegistrationError::InvalidUri(err.to_string()))?;
        if parsed.scheme() != "file" {
            return Err(RegistrationError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        let path = parsed
            .to_file_path()
            .map_err(|()| RegistrationError::InvalidUri(format!("not a local path: {uri}")))?;
        let Some(basename) = path.file_name().map(ToOwned::to_owned) else {
            return Err(RegistrationError::InvalidUri(format!("no file name: {uri}")));
        };

        let mut state = self.lock();
        let doc_id = if let Some(existing) = state.ids.get(&path) {
            existing.clone()
        } else {
            state.next_seq += 1;
            let fresh = format!("{:08x}", state.next_seq);
            state.ids.insert(path.clone(), fresh.clone());
            fresh
        };
        let grant = state.grants.entry((doc_id.clone(), app_id.clone())).or_default();
        grant.read = true;
        grant.write |= writable;
        drop(state);

        let exposed = self.mount_point.join(&doc_id).join(basename);
        let translated = Url::from_file_path(&exposed)
            .map_err(|()| RegistrationError::Failed(format!("unrepresentable path for {uri}")))?;
        tracing::debug!(
            uri,
            translated = %translated,
            app_id = %app_id,
            for_save,
            writable,
            "registered document"
        );
        Ok(translated.to_string())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
