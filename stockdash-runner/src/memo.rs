//! Memoization wrapper around an [`Orchestrator`].
//!
//! Keyed strictly on ticker and date range. The cache lock is only held for
//! lookup and insert, never during a build, so a slow request does not block
//! readers. Bundles with a transient provider failure are not stored, so the
//! next identical request tries again. Entries live until invalidated.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use stockdash_core::domain::Ticker;

use crate::bundle::{RequestKey, ResultBundle};
use crate::orchestrator::Orchestrator;

pub struct MemoizedOrchestrator {
    inner: Orchestrator,
    entries: Mutex<HashMap<RequestKey, Arc<ResultBundle>>>,
}

impl MemoizedOrchestrator {
    pub fn new(inner: Orchestrator) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &Orchestrator {
        &self.inner
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, Arc<ResultBundle>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the memoized bundle for this request, building it on a miss.
    pub fn build(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Arc<ResultBundle> {
        let key = RequestKey::new(ticker.clone(), start, end);
        if let Some(hit) = self.get(&key) {
            tracing::debug!(ticker = %ticker, %start, %end, "memo hit");
            return hit;
        }

        let bundle = Arc::new(self.inner.build(ticker, start, end));
        if bundle.has_transient_error() {
            tracing::debug!(ticker = %ticker, "not memoizing bundle with transient failure");
        } else {
            self.lock().insert(key, Arc::clone(&bundle));
        }
        bundle
    }

    pub fn get(&self, key: &RequestKey) -> Option<Arc<ResultBundle>> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Drop one entry. Returns true if it was present.
    pub fn invalidate(&self, key: &RequestKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
