// crates/chooser-portal-broker/src/portal.rs
// ============================================================================
// Module: Chooser Portal Mediator
// Description: Open/Save handlers, cancellation, and the two-stage response pipeline.
// Purpose: Broker file chooser calls between sandboxed callers and a backend.
// Dependencies: chooser-portal-config, chooser-portal-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`FileChooserPortal`] accepts `OpenFile` and `SaveFile` calls, validates
//! and filters their options synchronously, creates and exports a
//! [`Request`], and dispatches the backend call on the runtime without
//! waiting for it. The pipeline then runs in two stages:
//! - Stage 1 (answer arrival, async task): attach the backend answer to the
//!   request and hand off to the response workers. No blocking work.
//! - Stage 2 (response worker, blocking pool): register returned URIs with the
//!   [`DocumentRegistry`], then emit the single terminal response if the
//!   request is still exported.
//!
//! Invariants:
//! - Exactly one of {synchronous error, terminal response, silent
//!   cancellation} happens per accepted call.
//! - Lock order is request guard before registry; lookups never hold the
//!   registry lock while taking a request guard.
//! - The emitter runs with no lock held, so it may call back into the portal.
//!
//! Security posture: caller options and backend answers are untrusted; only
//! schema-allowed options reach the backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use chooser_portal_config::ChooserPortalConfig;
use chooser_portal_config::DEFAULT_MAX_RESPONSE_WORKERS;
use chooser_portal_config::DEFAULT_REQUEST_PATH_PREFIX;
use chooser_portal_config::validate_request_path_prefix;
use chooser_portal_core::BackendCall;
use chooser_portal_core::BackendError;
use chooser_portal_core::BackendResponse;
use chooser_portal_core::CallerContext;
use chooser_portal_core::DocumentRegistry;
use chooser_portal_core::FileChooserBackend;
use chooser_portal_core::PortalError;
use chooser_portal_core::RequestId;
use chooser_portal_core::Response;
use chooser_portal_core::ResponseCode;
use chooser_portal_core::ResponseEmitter;
use chooser_portal_core::VarDict;
use chooser_portal_core::Variant;
use chooser_portal_core::VariantType;
use chooser_portal_core::filter_options;
use chooser_portal_core::open_file_schema;
use chooser_portal_core::save_file_schema;
use chooser_portal_core::validate_choices;
use chooser_portal_core::validate_filters;
use chooser_portal_core::validation::CHOICES_KEY;
use chooser_portal_core::validation::FILTERS_KEY;
use thiserror::Error;
use tokio::runtime::Handle;

use crate::registry::RequestRegistry;
use crate::request::Request;
use crate::request::RequestKind;
use crate::tokens::RequestPaths;
use crate::tokens::handle_token;
use crate::workers::ActivityTracker;
use crate::workers::ResponseWorkers;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Result key carrying returned file references.
pub const URIS_KEY: &str = "uris";
/// Result key carrying the writable flag.
pub const WRITABLE_KEY: &str = "writable";

// ============================================================================
// SECTION: Build Errors
// ============================================================================

/// Errors returned while building a portal.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalBuildError {
    /// No backend was configured.
    #[error("portal backend is not configured")]
    MissingBackend,
    /// No document registry was configured.
    #[error("portal document registry is not configured")]
    MissingDocuments,
    /// No response emitter was configured.
    #[error("portal response emitter is not configured")]
    MissingEmitter,
    /// No runtime handle was provided and none is current.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),
    /// A builder setting is out of range.
    #[error("invalid portal setting: {0}")]
    InvalidSetting(String),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`FileChooserPortal`].
pub struct FileChooserPortalBuilder {
    /// Backend implementation.
    backend: Option<Arc<dyn FileChooserBackend>>,
    /// Document registration service.
    documents: Option<Arc<dyn DocumentRegistry>>,
    /// Terminal response emitter.
    emitter: Option<Arc<dyn ResponseEmitter>>,
    /// Object path prefix for request ids.
    path_prefix: String,
    /// Optional backend call timeout.
    call_timeout: Option<Duration>,
    /// Maximum concurrent translation stages.
    max_response_workers: usize,
    /// Runtime handle used for spawning.
    runtime: Option<Handle>,
}

impl Default for FileChooserPortalBuilder {
    fn default() -> Self {
        Self {
            backend: None,
            documents: None,
            emitter: None,
            path_prefix: DEFAULT_REQUEST_PATH_PREFIX.to_string(),
            call_timeout: None,
            max_response_workers: DEFAULT_MAX_RESPONSE_WORKERS,
            runtime: None,
        }
    }
}

impl FileChooserPortalBuilder {
    /// Sets the backend implementation.
    #[must_use]
    pub fn backend(mut self, backend: impl FileChooserBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Sets a shared backend implementation.
    #[must_use]
    pub fn shared_backend(mut self, backend: Arc<dyn FileChooserBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the document registration service.
    #[must_use]
    pub fn documents(mut self, documents: impl DocumentRegistry + 'static) -> Self {
        self.documents = Some(Arc::new(documents));
        self
    }

    /// Sets a shared document registration service.
    #[must_use]
    pub fn shared_documents(mut self, documents: Arc<dyn DocumentRegistry>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Sets the terminal response emitter.
    #[must_use]
    pub fn emitter(mut self, emitter: impl ResponseEmitter + 'static) -> Self {
        self.emitter = Some(Arc::new(emitter));
        self
    }

    /// Sets a shared terminal response emitter.
    #[must_use]
    pub fn shared_emitter(mut self, emitter: Arc<dyn ResponseEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Sets the object path prefix for request ids.
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Bounds every backend call by `timeout`.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of concurrent translation stages.
    #[must_use]
    pub fn max_response_workers(mut self, workers: usize) -> Self {
        self.max_response_workers = workers;
        self
    }

    /// Sets the runtime used for backend calls and workers.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Applies request, backend, and pipeline settings from `config`.
    #[must_use]
    pub fn config(mut self, config: &ChooserPortalConfig) -> Self {
        self.path_prefix.clone_from(&config.requests.path_prefix);
        self.call_timeout = config.backend.call_timeout();
        self.max_response_workers = config.pipeline.max_response_workers;
        self
    }

    /// Builds the portal.
    ///
    /// # Errors
    ///
    /// Returns [`PortalBuildError`] when a collaborator is missing, no runtime
    /// is available, the path prefix is not a valid object path prefix, or the
    /// worker bound is zero.
    pub fn build(self) -> Result<FileChooserPortal, PortalBuildError> {
        let backend = self.backend.ok_or(PortalBuildError::MissingBackend)?;
        let documents = self.documents.ok_or(PortalBuildError::MissingDocuments)?;
        let emitter = self.emitter.ok_or(PortalBuildError::MissingEmitter)?;
        validate_request_path_prefix(&self.path_prefix)
            .map_err(|err| PortalBuildError::InvalidSetting(err.to_string()))?;
        if self.max_response_workers == 0 {
            return Err(PortalBuildError::InvalidSetting(
                "max_response_workers must be positive".to_string(),
            ));
        }
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()
                .map_err(|err| PortalBuildError::NoRuntime(err.to_string()))?,
        };
        let activity = ActivityTracker::new();
        let workers =
            ResponseWorkers::new(runtime.clone(), self.max_response_workers, activity.clone());
        Ok(FileChooserPortal {
            inner: Arc::new(PortalInner {
                backend,
                documents,
                emitter,
                registry: RequestRegistry::new(),
                paths: RequestPaths::new(self.path_prefix),
                workers,
                runtime,
                call_timeout: self.call_timeout,
                activity,
            }),
        })
    }
}

// ============================================================================
// SECTION: Portal
// ============================================================================

/// File chooser mediator.
///
/// Cloning is cheap; clones share every collaborator and the request table.
#[derive(Clone)]
pub struct FileChooserPortal {
    /// Shared portal state.
    inner: Arc<PortalInner>,
}

/// Process-scoped collaborators and request table.
struct PortalInner {
    /// Backend implementation.
    backend: Arc<dyn FileChooserBackend>,
    /// Document registration service.
    documents: Arc<dyn DocumentRegistry>,
    /// Terminal response emitter.
    emitter: Arc<dyn ResponseEmitter>,
    /// Live requests.
    registry: RequestRegistry,
    /// Request id construction.
    paths: RequestPaths,
    /// Translation stage pool.
    workers: ResponseWorkers,
    /// Runtime used for backend calls.
    runtime: Handle,
    /// Optional backend call timeout.
    call_timeout: Option<Duration>,
    /// Outstanding pipeline tasks.
    activity: ActivityTracker,
}

impl FileChooserPortal {
    /// Returns a builder for the portal.
    #[must_use]
    pub fn builder() -> FileChooserPortalBuilder {
        FileChooserPortalBuilder::default()
    }

    /// Handles `OpenFile`.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidArgument`] for malformed options and
    /// [`PortalError::BackendUnavailable`] when the backend handle cannot be
    /// created.
    pub fn open_file(
        &self,
        caller: &CallerContext,
        parent_window: &str,
        title: &str,
        options: &VarDict,
    ) -> Result<RequestId, PortalError> {
        self.inner.accept(RequestKind::Open, caller, parent_window, title, options)
    }

    /// Handles `SaveFile`.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidArgument`] for malformed options and
    /// [`PortalError::BackendUnavailable`] when the backend handle cannot be
    /// created.
    pub fn save_file(
        &self,
        caller: &CallerContext,
        parent_window: &str,
        title: &str,
        options: &VarDict,
    ) -> Result<RequestId, PortalError> {
        self.inner.accept(RequestKind::Save, caller, parent_window, title, options)
    }

    /// Closes a request on behalf of `caller`.
    ///
    /// Unknown or already terminated ids are a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotAllowed`] when the request belongs to another
    /// sender.
    pub fn close_request(&self, caller: &CallerContext, id: &RequestId) -> Result<(), PortalError> {
        let Some(request) = self.inner.registry.get(id) else {
            return Ok(());
        };
        if request.sender() != caller.sender {
            return Err(PortalError::NotAllowed(format!("request {id} belongs to another caller")));
        }
        self.inner.cancel(&request);
        Ok(())
    }

    /// Closes every exported request owned by `sender`.
    ///
    /// Returns the number of requests closed.
    pub fn caller_disconnected(&self, sender: &str) -> usize {
        let closed = self
            .inner
            .registry
            .by_sender(sender)
            .iter()
            .filter(|request| self.inner.cancel(request))
            .count();
        if closed > 0 {
            tracing::debug!(sender, closed, "closed requests of disconnected caller");
        }
        closed
    }

    /// Returns the number of live requests.
    #[must_use]
    pub fn live_requests(&self) -> usize {
        self.inner.registry.len()
    }

    /// Resolves once no backend call or translation stage is outstanding.
    pub async fn wait_idle(&self) {
        self.inner.activity.wait_idle().await;
    }
}

// ============================================================================
// SECTION: Acceptance
// ============================================================================

impl PortalInner {
    /// Validates, filters, creates, exports, and dispatches one call.
    fn accept(
        self: &Arc<Self>,
        kind: RequestKind,
        caller: &CallerContext,
        parent_window: &str,
        title: &str,
        options: &VarDict,
    ) -> Result<RequestId, PortalError> {
        validate_compound_options(options)?;
        let token = handle_token(options)?;
        let schema = if kind.for_save() { save_file_schema() } else { open_file_schema() };
        let forwarded = filter_options(options, schema);

        let mut preferred = token.map(|token| self.paths.request_id(&caller.sender, &token));
        let request = self.registry.reserve(
            || preferred.take().unwrap_or_else(|| self.paths.random_request_id(&caller.sender)),
            |id| Request::new(id, caller.sender.clone(), caller.app_id.clone(), kind),
        );

        let handle = match self.backend.create_request(request.id()) {
            Ok(handle) => handle,
            Err(err) => {
                request.discard();
                self.registry.remove(&request);
                tracing::warn!(
                    request_id = %request.id(),
                    kind = kind.as_str(),
                    error = %err,
                    "backend handle creation failed"
                );
                return Err(err.into());
            }
        };
        request.export(handle);
        tracing::debug!(request_id = %request.id(), kind = kind.as_str(), "request exported");

        let call = BackendCall {
            request_id: request.id().clone(),
            app_id: caller.app_id.clone(),
            parent_window: parent_window.to_string(),
            title: title.to_string(),
            options: forwarded,
        };
        self.dispatch(&request, call);
        Ok(request.id().clone())
    }

    /// Spawns the backend call; its answer enters stage 1.
    fn dispatch(self: &Arc<Self>, request: &Arc<Request>, call: BackendCall) {
        let guard = self.activity.enter();
        let inner = Arc::clone(self);
        let request = Arc::clone(request);
        self.runtime.spawn(async move {
            let _guard = guard;
            let response = inner.call_backend(request.kind(), call).await;
            inner.answer_arrived(&request, response);
        });
    }

    /// Runs the backend call, folding every failure into code `2`.
    async fn call_backend(&self, kind: RequestKind, call: BackendCall) -> BackendResponse {
        let pending = match kind {
            RequestKind::Open => self.backend.open_file(call),
            RequestKind::Save => self.backend.save_file(call),
        };
        let outcome = match self.call_timeout {
            Some(timeout) => tokio::time::timeout(timeout, pending)
                .await
                .unwrap_or_else(|_| Err(BackendError::Timeout(duration_millis(timeout)))),
            None => pending.await,
        };
        outcome.unwrap_or_else(|err| {
            tracing::warn!(kind = kind.as_str(), error = %err, "backend call failed");
            BackendResponse::new(ResponseCode::OTHER, VarDict::new())
        })
    }

    // ========================================================================
    // SECTION: Stage 1
    // ========================================================================

    /// Attaches the backend answer and queues stage 2.
    fn answer_arrived(self: &Arc<Self>, request: &Arc<Request>, response: BackendResponse) {
        if !request.attach_result(response) {
            tracing::debug!(request_id = %request.id(), "answer for closed request ignored");
            return;
        }
        let inner = Arc::clone(self);
        let request = Arc::clone(request);
        self.workers.submit(move || inner.complete(&request));
    }

    // ========================================================================
    // SECTION: Stage 2
    // ========================================================================

    /// Translates the pending answer and emits the terminal response.
    fn complete(&self, request: &Arc<Request>) {
        let Some(pending) = request.take_pending() else {
            return;
        };
        let results = self.translate(request, pending.code, &pending.results);
        let code = pending.code;
        let Some(target) = request.finish() else {
            return;
        };
        self.registry.remove(request);
        let response = Response {
            code,
            results,
        };
        if let Err(err) = self.emitter.emit(&target, response) {
            tracing::warn!(request_id = %target.request_id, error = %err, "failed to emit response");
        }
        tracing::debug!(request_id = %request.id(), code = code.get(), "request terminated");
    }

    /// Builds the terminal result dictionary, registering returned URIs.
    fn translate(&self, request: &Request, code: ResponseCode, results: &VarDict) -> VarDict {
        let mut translated = VarDict::new();
        let mut uris = Vec::new();
        if code.is_success() {
            let writable =
                results.get(WRITABLE_KEY).is_none_or(|value| value.as_bool() == Some(true));
            if let Some(choices) = results.get(CHOICES_KEY) {
                translated.insert(CHOICES_KEY, choices.clone());
            }
            for uri in returned_uris(results) {
                match self.documents.register(uri, request.app_id(), request.kind().for_save(), writable)
                {
                    Ok(reference) => {
                        tracing::debug!(uri, reference = %reference, "converted uri");
                        uris.push(reference);
                    }
                    Err(err) => tracing::warn!(uri, error = %err, "failed to register uri"),
                }
            }
        }
        translated.insert(URIS_KEY, Variant::string_array(uris));
        translated
    }

    /// Release-only termination; returns true when this call closed `request`.
    fn cancel(&self, request: &Arc<Request>) -> bool {
        let Some(handle) = request.cancel() else {
            return false;
        };
        self.registry.remove(request);
        if let Err(err) = handle.close() {
            tracing::warn!(request_id = %request.id(), error = %err, "failed to close backend request");
        }
        tracing::debug!(request_id = %request.id(), "request closed");
        true
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates `filters` and `choices` when present.
fn validate_compound_options(options: &VarDict) -> Result<(), PortalError> {
    if let Some(filters) = options.get(FILTERS_KEY) {
        validate_filters(filters).map_err(|err| err.prefixed("invalid filters: "))?;
    }
    if let Some(choices) = options.get(CHOICES_KEY) {
        validate_choices(choices).map_err(|err| err.prefixed("invalid choices: "))?;
    }
    Ok(())
}

/// Returns the string items of the `uris` result when it is an `as` array.
fn returned_uris(results: &VarDict) -> impl Iterator<Item = &str> {
    results
        .get(URIS_KEY)
        .and_then(Variant::as_array)
        .filter(|array| *array.element() == VariantType::Str)
        .into_iter()
        .flat_map(|array| array.items().iter().filter_map(Variant::as_str))
}

/// Converts a timeout to whole milliseconds, saturating.
fn duration_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
