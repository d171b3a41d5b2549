use bnms_store::{LockKind, StoreError};
use thiserror::Error;

/// Another request already holds the lock for this key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate request: {kind} lock already held for {payload}")]
pub struct DuplicateRequestError {
    pub kind: LockKind,
    pub payload: String,
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateRequestError),

    /// The store failed; nothing is known about whether the key is held.
    #[error("lock store failure: {0}")]
    Store(#[from] StoreError),
}

impl LockError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, LockError::Duplicate(_))
    }
}
