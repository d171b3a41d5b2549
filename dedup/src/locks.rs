//! The lock operations over a shared store.

use std::future::Future;
use std::sync::Arc;

use bnms_store::{LockKey, LockKind, LockStore, RequestLock};
use bnms_types::{Clock, SystemClock, Timestamp};

use crate::error::{DuplicateRequestError, LockError};
use crate::guard::LockGuard;

/// Request deduplication over a [`LockStore`].
///
/// Cheap to clone; clones share the store and clock.
pub struct RequestLocks<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for RequestLocks<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: LockStore> RequestLocks<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Use `clock` to stamp new locks.
    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Insert a lock for `(kind, payload)`.
    ///
    /// If the key is already held, `on_duplicate` runs and the call fails
    /// with [`DuplicateRequestError`]. Never waits for the current holder.
    pub fn create_lock(
        &self,
        kind: LockKind,
        payload: &str,
        on_duplicate: impl FnOnce(),
    ) -> Result<RequestLock, LockError> {
        let lock = RequestLock::new(kind, payload, self.clock.now());
        if self.store.insert_if_absent(&lock)? {
            tracing::debug!(kind = %kind, payload, "request lock created");
            return Ok(lock);
        }
        tracing::debug!(kind = %kind, payload, "request lock already held");
        on_duplicate();
        Err(DuplicateRequestError {
            kind,
            payload: payload.to_string(),
        }
        .into())
    }

    /// Best-effort removal of the lock for `(kind, payload)`.
    pub fn delete_lock(&self, kind: LockKind, payload: &str) {
        delete_quietly(self.store.as_ref(), &LockKey::new(kind, payload));
    }

    /// [`create_lock`](Self::create_lock), returning a guard that deletes
    /// the lock when dropped.
    pub fn acquire(
        &self,
        kind: LockKind,
        payload: &str,
        on_duplicate: impl FnOnce(),
    ) -> Result<LockGuard<S>, LockError> {
        let lock = self.create_lock(kind, payload, on_duplicate)?;
        Ok(LockGuard::new(Arc::clone(&self.store), lock))
    }

    /// Run `section` while holding the lock for `(kind, payload)`.
    ///
    /// The lock is released whether `section` succeeds, fails, panics or the
    /// returned future is dropped before completion.
    pub async fn run_exclusive<T, E, F>(
        &self,
        kind: LockKind,
        payload: &str,
        on_duplicate: impl FnOnce(),
        section: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let _guard = self.acquire(kind, payload, on_duplicate)?;
        section.await
    }

    /// Delete every lock created more than `max_age_secs` before `now` and
    /// return the removed records.
    ///
    /// Only needed after a process died while holding locks. A holder that
    /// is still running when its lock is reaped will not delete a
    /// successor's lock on release.
    pub fn reconcile(
        &self,
        max_age_secs: u64,
        now: Timestamp,
    ) -> Result<Vec<RequestLock>, LockError> {
        let mut removed = Vec::new();
        for lock in self.store.list()? {
            if lock.created_at.elapsed_since(now) <= max_age_secs {
                continue;
            }
            if self.store.delete_if_owned(&lock.key(), lock.id)? {
                tracing::warn!(
                    kind = %lock.kind,
                    payload = %lock.payload,
                    created_at = %lock.created_at,
                    "removed leaked request lock"
                );
                removed.push(lock);
            }
        }
        Ok(removed)
    }

    /// Every lock currently held.
    pub fn held_locks(&self) -> Result<Vec<RequestLock>, LockError> {
        Ok(self.store.list()?)
    }
}

/// Delete `lock` if the store still holds that exact record, demoting any
/// failure to a warning.
pub(crate) fn release_quietly<S: LockStore + ?Sized>(store: &S, lock: &RequestLock) {
    match store.delete_if_owned(&lock.key(), lock.id) {
        Ok(true) => {
            tracing::trace!(kind = %lock.kind, payload = %lock.payload, "request lock released")
        }
        Ok(false) => tracing::warn!(
            kind = %lock.kind,
            payload = %lock.payload,
            "request lock was reaped before release; leaving the current holder's lock"
        ),
        Err(e) => {
            tracing::warn!(kind = %lock.kind, payload = %lock.payload, error = %e, "failed to delete request lock")
        }
    }
}

/// Delete `key`, demoting any failure to a warning.
fn delete_quietly<S: LockStore + ?Sized>(store: &S, key: &LockKey) {
    if let Err(e) = store.delete(key) {
        tracing::warn!(kind = %key.kind, payload = %key.payload, error = %e, "failed to delete request lock");
    }
}
