// crates/chooser-portal-broker/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted backend, recording registry, and portal harness.
// Purpose: Drive the request pipeline deterministically from tests.
// Dependencies: chooser-portal-broker, chooser-portal-core, tokio
// ============================================================================

//! ## Overview
//! [`ScriptedBackend`] parks every backend call until the test answers it
//! through [`ScriptedBackend::answer`]. [`RecordingRegistry`] records each
//! registration and fails URIs containing `fail`. [`Harness`] wires both into
//! a portal with a channel emitter.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    clippy::panic,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chooser_portal_broker::ChannelEmitter;
use chooser_portal_broker::EmittedResponse;
use chooser_portal_broker::FileChooserPortal;
use chooser_portal_broker::FileChooserPortalBuilder;
use chooser_portal_core::AppId;
use chooser_portal_core::BackendCall;
use chooser_portal_core::BackendError;
use chooser_portal_core::BackendRequestHandle;
use chooser_portal_core::BackendResponse;
use chooser_portal_core::CallerContext;
use chooser_portal_core::DocumentRegistry;
use chooser_portal_core::FileChooserBackend;
use chooser_portal_core::PortalError;
use chooser_portal_core::RegistrationError;
use chooser_portal_core::RequestId;
use chooser_portal_core::ResponseCode;
use chooser_portal_core::VarDict;
use chooser_portal_core::Variant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Application id used by default callers.
pub const APP_ID: &str = "org.example.Viewer";
/// Transport address used by default callers.
pub const SENDER: &str = ":1.5";

/// Returns the default caller.
pub fn caller() -> CallerContext {
    CallerContext::new(SENDER, APP_ID)
}

// ============================================================================
// SECTION: Scripted Backend
// ============================================================================

/// Outcome delivered to a parked backend call.
type Answer = Result<BackendResponse, BackendError>;

/// Shared state of the scripted backend.
#[derive(Default)]
struct BackendState {
    /// Forwarded calls in arrival order, tagged with the operation.
    calls: Vec<(&'static str, BackendCall)>,
    /// Answer senders keyed by request id.
    senders: BTreeMap<RequestId, oneshot::Sender<Answer>>,
    /// Answer receivers awaiting their call.
    receivers: BTreeMap<RequestId, oneshot::Receiver<Answer>>,
    /// Request ids whose handle was closed.
    closed: Vec<RequestId>,
    /// Number of handles created.
    created: usize,
    /// Whether handle creation fails.
    unavailable: bool,
}

/// Backend whose calls complete only when the test answers them.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    /// Shared state.
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    /// Creates a backend with no parked calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent handle creation fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Delivers `answer` to the call for `id`; returns false when nobody listens.
    pub fn respond(&self, id: &RequestId, answer: Answer) -> bool {
        let sender = self.state.lock().unwrap().senders.remove(id);
        sender.is_some_and(|sender| sender.send(answer).is_ok())
    }

    /// Answers the call for `id` with `code` and `results`.
    pub fn answer(&self, id: &RequestId, code: ResponseCode, results: VarDict) -> bool {
        self.respond(id, Ok(BackendResponse::new(code, results)))
    }

    /// Fails the call for `id` with a communication error.
    pub fn fail(&self, id: &RequestId) -> bool {
        self.respond(id, Err(BackendError::Communication("peer vanished".to_string())))
    }

    /// Returns the forwarded calls.
    pub fn calls(&self) -> Vec<(&'static str, BackendCall)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns the ids whose handle was closed.
    pub fn closed(&self) -> Vec<RequestId> {
        self.state.lock().unwrap().closed.clone()
    }

    /// Returns the number of handles created.
    pub fn created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    /// Parks a call until its answer arrives.
    async fn park(&self, kind: &'static str, call: BackendCall) -> Answer {
        let receiver = {
            let mut state = self.state.lock().unwrap();
            let receiver = state.receivers.remove(&call.request_id);
            state.calls.push((kind, call));
            receiver
        };
        match receiver {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(BackendError::Communication("answer dropped".to_string()))),
            None => Err(BackendError::Communication("no handle".to_string())),
        }
    }
}

/// Handle recording close calls.
struct ScriptedHandle {
    /// Request the handle belongs to.
    id: RequestId,
    /// Shared backend state.
    state: Arc<Mutex<BackendState>>,
}

impl BackendRequestHandle for ScriptedHandle {
    fn close(&self) -> Result<(), BackendError> {
        self.state.lock().unwrap().closed.push(self.id.clone());
        Ok(())
    }
}

#[async_trait]
impl FileChooserBackend for ScriptedBackend {
    fn create_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Arc<dyn BackendRequestHandle>, BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(BackendError::Unavailable("backend not running".to_string()));
        }
        let (sender, receiver) = oneshot::channel();
        state.senders.insert(request_id.clone(), sender);
        state.receivers.insert(request_id.clone(), receiver);
        state.created += 1;
        Ok(Arc::new(ScriptedHandle {
            id: request_id.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn open_file(&self, call: BackendCall) -> Result<BackendResponse, BackendError> {
        self.park("open", call).await
    }

    async fn save_file(&self, call: BackendCall) -> Result<BackendResponse, BackendError> {
        self.park("save", call).await
    }
}

// ============================================================================
// SECTION: Recording Registry
// ============================================================================

/// One recorded registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Raw URI.
    pub uri: String,
    /// Caller application.
    pub app_id: AppId,
    /// Save request flag.
    pub for_save: bool,
    /// Writable flag.
    pub writable: bool,
}

/// Registry recording every call; URIs containing `fail` are rejected.
#[derive(Clone, Default)]
pub struct RecordingRegistry {
    /// Recorded registrations.
    calls: Arc<Mutex<Vec<Registration>>>,
}

impl RecordingRegistry {
    /// Returns the recorded registrations.
    pub fn calls(&self) -> Vec<Registration> {
        self.calls.lock().unwrap().clone()
    }
}

impl DocumentRegistry for RecordingRegistry {
    fn register(
        &self,
        uri: &str,
        app_id: &AppId,
        for_save: bool,
        writable: bool,
    ) -> Result<String, RegistrationError> {
        self.calls.lock().unwrap().push(Registration {
            uri: uri.to_string(),
            app_id: app_id.clone(),
            for_save,
            writable,
        });
        if uri.contains("fail") {
            return Err(RegistrationError::Failed(format!("cannot export {uri}")));
        }
        Ok(registered(uri))
    }
}

/// Returns the reference [`RecordingRegistry`] produces for `uri`.
pub fn registered(uri: &str) -> String {
    format!("doc:{uri}")
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Portal wired to scripted collaborators.
pub struct Harness {
    /// Portal under test.
    pub portal: FileChooserPortal,
    /// Scripted backend.
    pub backend: ScriptedBackend,
    /// Recording registry.
    pub registry: RecordingRegistry,
    /// Emitted responses.
    pub responses: UnboundedReceiver<EmittedResponse>,
}

impl Harness {
    /// Builds a harness with default settings.
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// Builds a harness, letting the test adjust the builder.
    pub fn with(configure: impl FnOnce(FileChooserPortalBuilder) -> FileChooserPortalBuilder) -> Self {
        let backend = ScriptedBackend::new();
        let registry = RecordingRegistry::default();
        let (emitter, responses) = ChannelEmitter::channel();
        let builder = FileChooserPortal::builder()
            .backend(backend.clone())
            .documents(registry.clone())
            .emitter(emitter);
        let portal = configure(builder).build().unwrap();
        Self {
            portal,
            backend,
            registry,
            responses,
        }
    }

    /// Opens a file with `options` for the default caller.
    pub fn open(&self, options: &VarDict) -> RequestId {
        self.portal.open_file(&caller(), "x11:1", "Open", options).unwrap()
    }

    /// Opens with `options`, expecting a synchronous error.
    pub fn open_err(&self, options: &VarDict) -> PortalError {
        self.portal.open_file(&caller(), "", "Open", options).unwrap_err()
    }

    /// Waits for the next emitted response.
    pub async fn next_response(&mut self) -> EmittedResponse {
        tokio::time::timeout(Duration::from_secs(5), self.responses.recv())
            .await
            .expect("timed out waiting for response")
            .expect("emitter channel closed")
    }

    /// Waits until the portal is idle, then asserts nothing was emitted.
    pub async fn assert_silent(&mut self) {
        tokio::time::timeout(Duration::from_secs(5), self.portal.wait_idle())
            .await
            .expect("portal did not go idle");
        assert!(self.responses.try_recv().is_err(), "unexpected response emitted");
    }
}

/// Builds an `as` array.
pub fn uris(items: &[&str]) -> Variant {
    Variant::string_array(items.iter().copied())
}

/// Returns the `uris` strings of a result dictionary.
pub fn result_uris(results: &VarDict) -> Vec<String> {
    results
        .get("uris")
        .and_then(Variant::as_array)
        .map(|array| array.items().iter().filter_map(Variant::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}
