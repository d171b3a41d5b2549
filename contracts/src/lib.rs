//! Ledger transaction model and lifecycle contracts.
//!
//! Every party that must agree on a transaction runs the same contracts over
//! the same contents and must reach the same verdict, so everything in this
//! crate is pure: no I/O, no clocks, no shared mutable state.
//!
//! - [`validator::verify_initiator`]: is the initiating membership allowed to
//!   make this change, and is it a required signer?
//! - [`group::GroupContract`]: Bootstrap / Create / Modify / Exit of groups.
//! - [`membership::MembershipContract`]: Bootstrap / Request / Activate /
//!   Suspend / Modify* / Revoke of memberships.
//! - [`registry::ContractRegistry`]: runs every contract a transaction touches.

pub mod command;
pub mod error;
pub mod group;
pub mod membership;
pub mod registry;
pub mod state;
pub mod structure;
pub mod transaction;
pub mod validator;

pub use command::{Command, CommandData, GroupCommand, MembershipCommand};
pub use error::{AuthorizationError, EntityKind, ValidationError};
pub use group::{GroupContract, GroupRules, StandardGroupRules};
pub use membership::{MembershipContract, MembershipRules, StandardMembershipRules};
pub use registry::{Contract, ContractRegistry};
pub use state::{
    ContractId, ContractState, Group, Membership, StateAndRef, StateRef, TransactionState,
};
pub use transaction::{LedgerTransaction, TransactionBuilder, TransactionSignature};
pub use validator::verify_initiator;
