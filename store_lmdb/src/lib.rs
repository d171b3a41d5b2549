//! LMDB storage backend for the membership service.
//!
//! Implements the storage traits from `bnms-store` using the `heed` LMDB
//! bindings. Each logical store maps to one named database within a single
//! environment.

pub mod environment;
pub mod error;
pub mod lock;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use lock::LmdbLockStore;
