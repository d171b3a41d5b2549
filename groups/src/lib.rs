//! Issuance coordinators for business networks.
//!
//! A [`NetworkCoordinator`] acts for one party. Each operation checks for
//! conflicting states through a [`QueryService`], takes request locks on
//! the natural keys it is about to claim, builds the transaction, and drives
//! it through a [`SubmissionService`], verifying it against the contract
//! registry before finalisation.
//!
//! - [`NetworkCoordinator::bootstrap_network`]: new network, operator
//!   membership and initial group.
//! - [`NetworkCoordinator::create_group`], [`modify_group`](NetworkCoordinator::modify_group),
//!   [`exit_group`](NetworkCoordinator::exit_group).
//! - [`NetworkCoordinator::request_membership`] and the membership
//!   transitions, singly or in batches.

pub mod batch;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod group;
pub mod membership;
pub mod network;
pub mod service;

pub use batch::BatchOutcome;
pub use config::ServiceConfig;
pub use coordinator::NetworkCoordinator;
pub use error::GroupsError;
pub use group::{CreateGroup, ModifyGroup};
pub use membership::RequestMembership;
pub use network::{BootstrapNetwork, NetworkBootstrap};
pub use service::{FinalizedRecord, IssuancePhase, QueryService, SubmissionService};
