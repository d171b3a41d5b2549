//! Collaborators the coordinators depend on.
//!
//! Querying recorded states and submitting transactions are provided by the
//! surrounding ledger platform. The coordinators only see these traits.

use std::fmt;
use std::future::Future;

use bnms_contracts::{LedgerTransaction, StateAndRef};
use bnms_store::StoreError;
use bnms_types::{NetworkId, Party, TxHash, UniqueIdentifier};

use crate::error::GroupsError;

/// Read access to the current (unconsumed) group and membership states.
pub trait QueryService: Send + Sync {
    fn group_by_id(&self, linear_id: &UniqueIdentifier) -> Result<Option<StateAndRef>, StoreError>;

    fn groups_by_name(
        &self,
        network_id: &NetworkId,
        name: &str,
    ) -> Result<Vec<StateAndRef>, StoreError>;

    fn membership(
        &self,
        network_id: &NetworkId,
        party: &Party,
    ) -> Result<Option<StateAndRef>, StoreError>;

    fn memberships(&self, network_id: &NetworkId) -> Result<Vec<StateAndRef>, StoreError>;

    fn network_exists(&self, network_id: &NetworkId) -> Result<bool, StoreError>;
}

/// A finalised transaction and the states it recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedRecord {
    pub tx_id: TxHash,
    pub outputs: Vec<StateAndRef>,
}

impl FinalizedRecord {
    /// The single group output, if any.
    pub fn group(&self) -> Option<&StateAndRef> {
        self.outputs.iter().find(|s| s.group().is_some())
    }

    /// The single membership output, if any.
    pub fn membership(&self) -> Option<&StateAndRef> {
        self.outputs.iter().find(|s| s.membership().is_some())
    }
}

/// Gathers counterparty signatures and finalises transactions.
///
/// Both operations may suspend for a long time (counterparties and the
/// finality service are remote).
pub trait SubmissionService: Send + Sync {
    /// Return `tx` carrying the signatures of every required signer.
    fn collect_signatures(
        &self,
        tx: LedgerTransaction,
    ) -> impl Future<Output = Result<LedgerTransaction, GroupsError>> + Send;

    /// Record a fully signed transaction on the ledger.
    fn finalize(
        &self,
        tx: LedgerTransaction,
    ) -> impl Future<Output = Result<FinalizedRecord, GroupsError>> + Send;
}

/// Named stages of an issuance, logged as the `phase` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssuancePhase {
    CheckingConflicts,
    Locking,
    Building,
    AwaitingCoSignature,
    Verifying,
    AwaitingFinalization,
    Finalized,
}

impl fmt::Display for IssuancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckingConflicts => "checking conflicts",
            Self::Locking => "locking",
            Self::Building => "building",
            Self::AwaitingCoSignature => "awaiting co-signature",
            Self::Verifying => "verifying",
            Self::AwaitingFinalization => "awaiting finalization",
            Self::Finalized => "finalized",
        };
        f.write_str(name)
    }
}
