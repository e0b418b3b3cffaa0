// crates/chooser-portal-broker/src/request.rs
// ============================================================================
// Module: Chooser Portal Request Lifecycle
// Description: One in-flight mediated call with guarded lifecycle state.
// Purpose: Serialize every check-and-transition so a request terminates once.
// Dependencies: chooser-portal-core
// ============================================================================

//! ## Overview
//! A [`Request`] moves `Created -> Exported -> Terminated`. Its mutable fields
//! (phase, pending backend result, backend handle) live behind a single guard
//! and are only reachable through atomic check-and-transition operations.
//! Invariants:
//! - Only the caller that observes `Exported -> Terminated` runs the terminal
//!   action, and it runs that action after releasing the guard.
//! - Once terminated, attaching a result is refused and nothing is emitted.
//! - Terminating releases the backend handle and any pending result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use chooser_portal_core::AppId;
use chooser_portal_core::BackendRequestHandle;
use chooser_portal_core::BackendResponse;
use chooser_portal_core::RequestId;
use chooser_portal_core::ResponseTarget;

// ============================================================================
// SECTION: Request Kinds
// ============================================================================

/// Operation kind of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Pick one or more existing files.
    Open,
    /// Name a file to be written.
    Save,
}

impl RequestKind {
    /// Returns true for save requests.
    #[must_use]
    pub const fn for_save(self) -> bool {
        matches!(self, Self::Save)
    }

    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open_file",
            Self::Save => "save_file",
        }
    }
}

/// Lifecycle phase of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPhase {
    /// Accepted but not yet reachable by cancellation.
    Created,
    /// Reachable by cancellation; a terminal action is still pending.
    Exported,
    /// A terminal action ran; the request is inert.
    Terminated,
}

// ============================================================================
// SECTION: Request
// ============================================================================

/// Mutable state guarded by the request lock.
struct RequestState {
    /// Current lifecycle phase.
    phase: RequestPhase,
    /// Backend-side handle used by cancellation.
    backend_handle: Option<Arc<dyn BackendRequestHandle>>,
    /// Backend answer awaiting translation.
    pending: Option<BackendResponse>,
}

/// One in-flight mediated call.
///
/// # Invariants
/// - `id`, `sender`, `app_id`, and `kind` never change after creation.
pub struct Request {
    /// Request identifier and export key.
    id: RequestId,
    /// Transport address of the caller.
    sender: String,
    /// Application identifier of the caller.
    app_id: AppId,
    /// Operation kind.
    kind: RequestKind,
    /// Guarded lifecycle state.
    state: Mutex<RequestState>,
}

impl Request {
    /// Creates a request in the `Created` phase.
    #[must_use]
    pub fn new(id: RequestId, sender: impl Into<String>, app_id: AppId, kind: RequestKind) -> Self {
        Self {
            id,
            sender: sender.into(),
            app_id,
            kind,
            state: Mutex::new(RequestState {
                phase: RequestPhase::Created,
                backend_handle: None,
                pending: None,
            }),
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Returns the caller's transport address.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the caller's application identifier.
    #[must_use]
    pub const fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Returns the emission target for this request.
    #[must_use]
    pub fn target(&self) -> ResponseTarget {
        ResponseTarget {
            request_id: self.id.clone(),
            sender: self.sender.clone(),
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> RequestPhase {
        self.lock().phase
    }

    /// Returns true while the request awaits a terminal action.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.phase() == RequestPhase::Exported
    }

    /// Transitions `Created -> Exported`, storing the backend handle.
    ///
    /// Returns false when the request was not in the `Created` phase.
    pub fn export(&self, handle: Arc<dyn BackendRequestHandle>) -> bool {
        let mut state = self.lock();
        if state.phase != RequestPhase::Created {
            return false;
        }
        state.phase = RequestPhase::Exported;
        state.backend_handle = Some(handle);
        true
    }

    /// Attaches a backend answer while the request is exported.
    ///
    /// Returns false and drops `response` when the request already terminated.
    pub fn attach_result(&self, response: BackendResponse) -> bool {
        let mut state = self.lock();
        if state.phase != RequestPhase::Exported {
            return false;
        }
        state.pending = Some(response);
        true
    }

    /// Takes the pending backend answer while the request is exported.
    #[must_use]
    pub fn take_pending(&self) -> Option<BackendResponse> {
        let mut state = self.lock();
        if state.phase != RequestPhase::Exported {
            return None;
        }
        state.pending.take()
    }

    /// Transitions `Exported -> Terminated` for delivery of the response.
    ///
    /// Returns the emission target when this call performed the transition;
    /// the caller then owns the single terminal response. Returns `None` when
    /// the request was already closed or finished.
    #[must_use]
    pub fn finish(&self) -> Option<ResponseTarget> {
        let mut state = self.lock();
        if state.phase != RequestPhase::Exported {
            return None;
        }
        state.phase = RequestPhase::Terminated;
        state.backend_handle = None;
        state.pending = None;
        drop(state);
        Some(self.target())
    }

    /// Release-only termination for cancellation.
    ///
    /// Returns the backend handle when this call performed the
    /// `Exported -> Terminated` transition.
    #[must_use]
    pub fn cancel(&self) -> Option<Arc<dyn BackendRequestHandle>> {
        let mut state = self.lock();
        if state.phase != RequestPhase::Exported {
            return None;
        }
        state.phase = RequestPhase::Terminated;
        state.pending = None;
        state.backend_handle.take()
    }

    /// Marks a never-exported request as terminated.
    pub fn discard(&self) {
        let mut state = self.lock();
        if state.phase == RequestPhase::Created {
            state.phase = RequestPhase::Terminated;
        }
    }

    /// Acquires the guard, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("sender", &self.sender)
            .field("app_id", &self.app_id)
            .field("kind", &self.kind)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    //! Lifecycle transition tests.
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use std::sync::Arc;

    use chooser_portal_core::AppId;
    use chooser_portal_core::BackendRequestHandle;
    use chooser_portal_core::BackendResponse;
    use chooser_portal_core::RequestId;
    use chooser_portal_core::ResponseCode;
    use chooser_portal_core::VarDict;

    use super::Request;
    use super::RequestKind;
    use super::RequestPhase;

    struct NoopHandle;

    impl BackendRequestHandle for NoopHandle {}

    fn exported() -> Request {
        let request =
            Request::new(RequestId::from("/r/1_1/t1"), ":1.1", AppId::from("org.example"), RequestKind::Open);
        assert!(request.export(Arc::new(NoopHandle)));
        request
    }

    #[test]
    fn finish_hands_out_target_once() {
        let request = exported();
        let target = request.finish().unwrap();
        assert_eq!(target.request_id, *request.id());
        assert_eq!(target.sender, ":1.1");
        assert!(request.finish().is_none());
        assert_eq!(request.phase(), RequestPhase::Terminated);
        assert!(request.cancel().is_none());
    }

    #[test]
    fn cancel_then_finish_emits_nothing() {
        let request = exported();
        assert!(request.cancel().is_some());
        assert!(request.cancel().is_none());
        assert!(request.finish().is_none());
        assert!(!request.attach_result(BackendResponse::new(ResponseCode::SUCCESS, VarDict::new())));
    }

    #[test]
    fn pending_result_is_taken_once() {
        let request = exported();
        assert!(request.attach_result(BackendResponse::new(ResponseCode::CANCELLED, VarDict::new())));
        assert_eq!(request.take_pending().map(|pending| pending.code), Some(ResponseCode::CANCELLED));
        assert!(request.take_pending().is_none());
    }

    #[test]
    fn created_request_is_not_cancellable() {
        let request =
            Request::new(RequestId::from("/r/1_1/t2"), ":1.1", AppId::default(), RequestKind::Save);
        assert!(request.cancel().is_none());
        request.discard();
        assert!(!request.export(Arc::new(NoopHandle)));
        assert!(RequestKind::Save.for_save());
    }
}
