//! Fundamental types for the business network membership service.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! parties, keys, linear identifiers, timestamps, membership statuses and roles.

pub mod error;
pub mod hash;
pub mod id;
pub mod identity;
pub mod keys;
pub mod network;
pub mod party;
pub mod role;
pub mod state;
pub mod time;

pub use error::BnmsError;
pub use hash::TxHash;
pub use id::UniqueIdentifier;
pub use identity::{BusinessIdentity, MembershipIdentity};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use party::Party;
pub use role::{Permission, Role};
pub use state::MembershipStatus;
pub use time::{Clock, SystemClock, Timestamp};
