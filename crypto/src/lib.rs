//! Cryptographic primitives for the membership service.
//!
//! - **Ed25519** for transaction signatures
//! - **Blake2b-256** for transaction ids

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi, hash_transaction};
pub use keys::{keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
