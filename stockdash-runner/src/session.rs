//! Request supersession: only the newest request may publish its bundle.
//!
//! Each call to [`RequestGate::begin`] opens a new generation and cancels the
//! token of the previous one. A build that finishes late still holds its old
//! ticket, so [`RequestGate::publish`] rejects it and a stale bundle can never
//! replace a newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::bundle::ResultBundle;

/// Cooperative cancellation flag shared between a request and its tasks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Proof that a request was started, and at which generation.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    token: CancelToken,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

#[derive(Debug, Default)]
struct GateState {
    generation: u64,
    token: CancelToken,
    current: Option<Arc<ResultBundle>>,
}

#[derive(Debug, Default)]
pub struct RequestGate {
    state: Mutex<GateState>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a new request, superseding whatever was in flight.
    pub fn begin(&self) -> RequestTicket {
        let mut state = self.lock();
        state.token.cancel();
        state.generation += 1;
        state.token = CancelToken::new();
        tracing::debug!(generation = state.generation, "request started");
        RequestTicket {
            generation: state.generation,
            token: state.token.clone(),
        }
    }

    /// Publish `bundle` if `ticket` is still the latest request.
    ///
    /// Returns `false` and drops the bundle when a newer request has begun.
    pub fn publish(&self, ticket: &RequestTicket, bundle: ResultBundle) -> bool {
        let mut state = self.lock();
        if ticket.generation != state.generation {
            tracing::debug!(
                stale = ticket.generation,
                latest = state.generation,
                "discarding superseded bundle"
            );
            return false;
        }
        state.current = Some(Arc::new(bundle));
        true
    }

    /// The most recently published bundle, if any.
    pub fn current(&self) -> Option<Arc<ResultBundle>> {
        self.lock().current.clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.lock().generation
    }
}
