//! Scope-bound ownership of a request lock.

use std::sync::Arc;

use bnms_store::{LockStore, RequestLock};

use crate::locks::release_quietly;

/// Holds a request lock until dropped.
///
/// Dropping the guard deletes the lock on every exit path: normal return,
/// early `?` return, panic unwinding, and cancellation of the future that
/// owns it. Deletion failures are logged, never raised.
///
/// Only the record this guard created is deleted. If the lock was reaped by
/// [`reconcile`](crate::RequestLocks::reconcile) and the key re-acquired,
/// the newer holder's lock is left alone.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<S: LockStore> {
    store: Arc<S>,
    lock: Option<RequestLock>,
}

impl<S: LockStore> LockGuard<S> {
    pub(crate) fn new(store: Arc<S>, lock: RequestLock) -> Self {
        Self {
            store,
            lock: Some(lock),
        }
    }

    /// The held lock record.
    pub fn lock(&self) -> Option<&RequestLock> {
        self.lock.as_ref()
    }

    /// Release now instead of at end of scope.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(lock) = self.lock.take() {
            release_quietly(self.store.as_ref(), &lock);
        }
    }
}

impl<S: LockStore> Drop for LockGuard<S> {
    fn drop(&mut self) {
        self.release_inner();
    }
}
