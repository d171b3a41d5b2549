//! Request deduplication locks.
//!
//! Before issuing an entity keyed by a caller-chosen natural identifier, a
//! coordinator takes a lock on `(kind, payload)` in a shared [`LockStore`].
//! The store's uniqueness constraint is the only exclusion mechanism:
//! acquisition never waits, a second concurrent request for the same key
//! fails immediately with [`DuplicateRequestError`].
//!
//! Locks are advisory. Callers still check for an existing entity first;
//! the lock only closes the window between that check and finalisation.

pub mod error;
pub mod guard;
pub mod locks;

pub use error::{DuplicateRequestError, LockError};
pub use guard::LockGuard;
pub use locks::RequestLocks;

pub use bnms_store::{LockKey, LockKind, LockStore, RequestLock};
