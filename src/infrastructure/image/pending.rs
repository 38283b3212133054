//! Completed results waiting for the next drain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::domain::entities::{ImageResult, LoadTicket};

/// Outcome of a non-blocking take.
#[derive(Debug)]
pub enum TakeOutcome {
    /// Nothing was waiting.
    Empty,
    /// A writer held the lock; nothing was read or modified.
    Contended,
    /// Every waiting result, now owned by the caller.
    Ready(HashMap<LoadTicket, ImageResult>),
}

/// Lock-guarded map from ticket to its completed result.
///
/// Fetch tasks only insert; the drain only takes everything at once.
#[derive(Debug, Default)]
pub struct PendingResults {
    results: Mutex<HashMap<LoadTicket, ImageResult>>,
    len: AtomicUsize,
}

impl PendingResults {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result for `ticket`, waiting for the lock if needed.
    pub fn insert(&self, ticket: LoadTicket, result: ImageResult) {
        let mut results = self.results.lock();
        results.insert(ticket, result);
        self.len.store(results.len(), Ordering::Release);
    }

    /// Takes all waiting results without ever blocking.
    pub fn try_take_all(&self) -> TakeOutcome {
        if self.is_empty() {
            return TakeOutcome::Empty;
        }
        let Some(mut results) = self.results.try_lock() else {
            return TakeOutcome::Contended;
        };
        self.len.store(0, Ordering::Release);
        TakeOutcome::Ready(std::mem::take(&mut *results))
    }

    /// Number of waiting results, read without locking.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn hold_lock(&self) -> parking_lot::MutexGuard<'_, HashMap<LoadTicket, ImageResult>> {
        self.results.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ImageFormat, RawImage};
    use crate::domain::errors::LoadError;

    #[test]
    fn test_empty_fast_path() {
        let pending = PendingResults::new();

        assert!(matches!(pending.try_take_all(), TakeOutcome::Empty));
    }

    #[test]
    fn test_take_all_clears() {
        let pending = PendingResults::new();
        pending.insert(LoadTicket::new(0), Ok(RawImage::new(&b"a"[..], ImageFormat::Png)));
        pending.insert(LoadTicket::new(1), Err(LoadError::EmptyBody));
        assert_eq!(pending.len(), 2);

        let TakeOutcome::Ready(taken) = pending.try_take_all() else {
            panic!("expected ready results");
        };

        assert_eq!(taken.len(), 2);
        assert_eq!(taken[&LoadTicket::new(1)], Err(LoadError::EmptyBody));
        assert!(pending.is_empty());
        assert!(matches!(pending.try_take_all(), TakeOutcome::Empty));
    }

    #[test]
    fn test_contended_take_leaves_results() {
        let pending = PendingResults::new();
        pending.insert(LoadTicket::new(7), Err(LoadError::UnknownFormat));

        {
            let _guard = pending.hold_lock();
            assert!(matches!(pending.try_take_all(), TakeOutcome::Contended));
        }

        assert_eq!(pending.len(), 1);
        assert!(matches!(pending.try_take_all(), TakeOutcome::Ready(r) if r.len() == 1));
    }
}
