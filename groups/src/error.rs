use bnms_contracts::ValidationError;
use bnms_dedup::{DuplicateRequestError, LockError};
use bnms_store::StoreError;
use bnms_types::BnmsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupsError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Duplicate(#[from] DuplicateRequestError),

    #[error("transaction rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Types(#[from] BnmsError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<LockError> for GroupsError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::Duplicate(d) => GroupsError::Duplicate(d),
            LockError::Store(s) => GroupsError::Store(s),
        }
    }
}
