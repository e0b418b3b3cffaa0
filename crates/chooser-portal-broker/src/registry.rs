// crates/chooser-portal-broker/src/registry.rs
// ============================================================================
// Module: Chooser Portal Request Registry
// Description: Lookup table of live requests keyed by request id.
// Purpose: Allocate unique ids and locate requests for cancellation.
// Dependencies: chooser-portal-core
// ============================================================================

//! ## Overview
//! The registry owns one [`Arc<Request>`] per live request id. It never holds
//! its lock while a request guard is taken by the same caller: lookups clone
//! the `Arc` and release the registry before touching the request.
//! Invariants:
//! - At most one live request per id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use chooser_portal_core::RequestId;

use crate::request::Request;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Table of live requests.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    /// Live requests keyed by id.
    requests: Mutex<BTreeMap<RequestId, Arc<Request>>>,
}

impl RequestRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a request under the first id from `next_id` not already in use.
    pub fn reserve<N, B>(&self, mut next_id: N, build: B) -> Arc<Request>
    where
        N: FnMut() -> RequestId,
        B: FnOnce(RequestId) -> Request,
    {
        let mut requests = self.lock();
        let mut id = next_id();
        while requests.contains_key(&id) {
            id = next_id();
        }
        let request = Arc::new(build(id.clone()));
        requests.insert(id, Arc::clone(&request));
        request
    }

    /// Returns the live request for `id`.
    #[must_use]
    pub fn get(&self, id: &RequestId) -> Option<Arc<Request>> {
        self.lock().get(id).cloned()
    }

    /// Removes `request` when it is still the entry for its id.
    pub fn remove(&self, request: &Arc<Request>) {
        if let Entry::Occupied(entry) = self.lock().entry(request.id().clone())
            && Arc::ptr_eq(entry.get(), request)
        {
            entry.remove();
        }
    }

    /// Returns every live request owned by `sender`.
    #[must_use]
    pub fn by_sender(&self, sender: &str) -> Vec<Arc<Request>> {
        self.lock().values().filter(|request| request.sender() == sender).cloned().collect()
    }

    /// Returns the number of live requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no request is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Acquires the table lock, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<RequestId, Arc<Request>>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
