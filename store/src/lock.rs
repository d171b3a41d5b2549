//! Request lock storage trait.
//!
//! A request lock marks an issuance that is in flight for a natural key
//! (a network id, a group id, a group name, a pending membership). The store
//! enforces uniqueness on `(kind, payload)`; nothing else about the lock is
//! interpreted here.

use bnms_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::StoreError;

/// What kind of natural key a lock guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LockKind {
    NetworkId,
    GroupId,
    GroupName,
    PendingMembership,
}

impl LockKind {
    pub const ALL: [LockKind; 4] = [
        LockKind::NetworkId,
        LockKind::GroupId,
        LockKind::GroupName,
        LockKind::PendingMembership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkId => "NETWORK_ID",
            Self::GroupId => "GROUP_ID",
            Self::GroupName => "GROUP_NAME",
            Self::PendingMembership => "PENDING_MEMBERSHIP",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::NetworkId => 1,
            Self::GroupId => 2,
            Self::GroupName => 3,
            Self::PendingMembership => 4,
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The uniqueness key of a request lock.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LockKey {
    pub kind: LockKind,
    pub payload: String,
}

impl LockKey {
    pub fn new(kind: LockKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Binary key: one kind tag byte followed by the UTF-8 payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + self.payload.len());
        key.push(self.kind.tag());
        key.extend_from_slice(self.payload.as_bytes());
        key
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.payload)
    }
}

/// A held request lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLock {
    pub id: Uuid,
    pub kind: LockKind,
    pub payload: String,
    pub created_at: Timestamp,
}

impl RequestLock {
    pub fn new(kind: LockKind, payload: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload: payload.into(),
            created_at,
        }
    }

    pub fn key(&self) -> LockKey {
        LockKey::new(self.kind, self.payload.clone())
    }
}

/// Trait for persisting request locks.
///
/// Implementations must make `insert_if_absent` atomic: of any number of
/// concurrent inserts for the same key, across threads and across processes
/// sharing the store, exactly one observes `true`.
pub trait LockStore: Send + Sync {
    /// Insert `lock` unless a lock with the same key exists.
    ///
    /// Returns `false` (and stores nothing) if the key is already held.
    fn insert_if_absent(&self, lock: &RequestLock) -> Result<bool, StoreError>;

    /// Remove the lock for `key`. Returns whether a lock was removed.
    fn delete(&self, key: &LockKey) -> Result<bool, StoreError>;

    /// Remove the lock for `key` only if it is still the one with `id`.
    ///
    /// The comparison and the removal must be one atomic step. Returns
    /// whether a lock was removed.
    fn delete_if_owned(&self, key: &LockKey, id: Uuid) -> Result<bool, StoreError>;

    fn get(&self, key: &LockKey) -> Result<Option<RequestLock>, StoreError>;

    /// All currently held locks.
    fn list(&self) -> Result<Vec<RequestLock>, StoreError>;
}

impl<S: LockStore + ?Sized> LockStore for std::sync::Arc<S> {
    fn insert_if_absent(&self, lock: &RequestLock) -> Result<bool, StoreError> {
        (**self).insert_if_absent(lock)
    }

    fn delete(&self, key: &LockKey) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn delete_if_owned(&self, key: &LockKey, id: Uuid) -> Result<bool, StoreError> {
        (**self).delete_if_owned(key, id)
    }

    fn get(&self, key: &LockKey) -> Result<Option<RequestLock>, StoreError> {
        (**self).get(key)
    }

    fn list(&self) -> Result<Vec<RequestLock>, StoreError> {
        (**self).list()
    }
}
