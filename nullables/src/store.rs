//! Nullable lock store: thread-safe in-memory storage for testing.

use bnms_store::{LockKey, LockStore, RequestLock, StoreError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// An in-memory lock store for testing.
///
/// Check-and-insert happens under one mutex, so it has the same uniqueness
/// guarantee as a real store. Failures can be injected to exercise error
/// paths.
pub struct NullLockStore {
    locks: Mutex<BTreeMap<LockKey, RequestLock>>,
    fail_inserts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl NullLockStore {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(BTreeMap::new()),
            fail_inserts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent insert fail with a backend error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail with a backend error.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Put a lock in place directly, bypassing uniqueness (for leaked-lock scenarios).
    pub fn seed(&self, lock: RequestLock) {
        self.locks.lock().unwrap().insert(lock.key(), lock);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NullLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStore for NullLockStore {
    fn insert_if_absent(&self, lock: &RequestLock) -> Result<bool, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected insert failure".into()));
        }
        let mut locks = self.locks.lock().unwrap();
        if locks.contains_key(&lock.key()) {
            return Ok(false);
        }
        locks.insert(lock.key(), lock.clone());
        Ok(true)
    }

    fn delete(&self, key: &LockKey) -> Result<bool, StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected delete failure".into()));
        }
        Ok(self.locks.lock().unwrap().remove(key).is_some())
    }

    fn delete_if_owned(&self, key: &LockKey, id: Uuid) -> Result<bool, StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected delete failure".into()));
        }
        let mut locks = self.locks.lock().unwrap();
        if locks.get(key).is_some_and(|held| held.id == id) {
            locks.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    fn get(&self, key: &LockKey) -> Result<Option<RequestLock>, StoreError> {
        Ok(self.locks.lock().unwrap().get(key).cloned())
    }

    fn list(&self) -> Result<Vec<RequestLock>, StoreError> {
        Ok(self.locks.lock().unwrap().values().cloned().collect())
    }
}
