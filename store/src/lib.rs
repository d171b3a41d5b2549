//! Abstract storage traits for the membership service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod lock;

pub use error::StoreError;
pub use lock::{LockKey, LockKind, LockStore, RequestLock};
