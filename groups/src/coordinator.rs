//! Shared machinery of the issuance coordinators.
//!
//! Every coordinator follows the same shape: check for conflicting states,
//! take the request locks for the natural keys involved, build the proposal,
//! then sign, collect co-signatures, verify and finalise. Lock guards live
//! until the coordinator returns, so release happens on every exit path.

use std::sync::Arc;

use bnms_contracts::{ContractRegistry, LedgerTransaction, StateAndRef};
use bnms_dedup::{LockGuard, LockKind, LockStore, RequestLock, RequestLocks};
use bnms_types::{Clock, KeyPair, NetworkId, Party, SystemClock, Timestamp};
use bnms_utils::format_duration;

use crate::config::ServiceConfig;
use crate::error::GroupsError;
use crate::service::{FinalizedRecord, IssuancePhase, QueryService, SubmissionService};

/// Runs network, group and membership issuance on behalf of one party.
pub struct NetworkCoordinator<Q, T, L> {
    pub(crate) identity: Party,
    keys: KeyPair,
    pub(crate) query: Arc<Q>,
    submission: Arc<T>,
    locks: RequestLocks<L>,
    contracts: ContractRegistry,
    clock: Arc<dyn Clock>,
}

impl<Q, T, L> NetworkCoordinator<Q, T, L>
where
    Q: QueryService,
    T: SubmissionService,
    L: LockStore,
{
    /// A coordinator acting as the party `name`, signing with `keys`.
    pub fn new(
        name: impl Into<String>,
        keys: KeyPair,
        query: Arc<Q>,
        submission: Arc<T>,
        locks: RequestLocks<L>,
    ) -> Result<Self, GroupsError> {
        let identity = Party::new(name, keys.public.clone())?;
        Ok(Self {
            identity,
            keys,
            query,
            submission,
            locks,
            contracts: ContractRegistry::standard(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Verify proposals with `contracts` instead of the standard registry.
    pub fn with_contracts(mut self, contracts: ContractRegistry) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn identity(&self) -> &Party {
        &self.identity
    }

    pub fn locks(&self) -> &RequestLocks<L> {
        &self.locks
    }

    /// Remove request locks older than `config.lock_max_age_secs`.
    pub fn reconcile_locks(&self, config: &ServiceConfig) -> Result<Vec<RequestLock>, GroupsError> {
        let removed = self.locks.reconcile(config.lock_max_age_secs, self.now())?;
        if !removed.is_empty() {
            tracing::info!(
                count = removed.len(),
                max_age = %format_duration(config.lock_max_age_secs),
                "reconciled leaked request locks"
            );
        }
        Ok(removed)
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// The current membership of `party` in `network_id`.
    pub(crate) fn membership_of(
        &self,
        network_id: &NetworkId,
        party: &Party,
    ) -> Result<StateAndRef, GroupsError> {
        self.query.membership(network_id, party)?.ok_or_else(|| {
            GroupsError::NotFound(format!("membership of {party} in network {network_id}"))
        })
    }

    /// Take the request lock for `(kind, payload)`.
    pub(crate) fn lock(&self, kind: LockKind, payload: &str) -> Result<LockGuard<L>, GroupsError> {
        tracing::debug!(phase = %IssuancePhase::Locking, kind = %kind, payload, "taking request lock");
        let guard = self.locks.acquire(kind, payload, || {
            tracing::warn!(kind = %kind, payload, "concurrent request for the same key rejected");
        })?;
        Ok(guard)
    }

    /// Sign, collect co-signatures, verify and finalise `tx`.
    pub(crate) async fn submit(
        &self,
        mut tx: LedgerTransaction,
    ) -> Result<FinalizedRecord, GroupsError> {
        let tx_id = tx.id();
        tx.sign(&self.keys);

        tracing::info!(tx = %tx_id, phase = %IssuancePhase::AwaitingCoSignature, "collecting signatures");
        let tx = self.submission.collect_signatures(tx).await?;

        tracing::debug!(tx = %tx_id, phase = %IssuancePhase::Verifying, "verifying proposal");
        self.contracts.verify(&tx)?;

        tracing::info!(tx = %tx_id, phase = %IssuancePhase::AwaitingFinalization, "finalizing");
        let record = self.submission.finalize(tx).await?;

        tracing::info!(tx = %record.tx_id, phase = %IssuancePhase::Finalized, outputs = record.outputs.len(), "transaction finalized");
        Ok(record)
    }
}

/// The lock payload for a group id. Uniqueness is on the uuid alone.
pub(crate) fn group_id_payload(id: &bnms_types::UniqueIdentifier) -> String {
    id.id.to_string()
}

/// The lock payload for a group name, scoped to its network.
pub(crate) fn group_name_payload(network_id: &NetworkId, name: &str) -> String {
    format!("{network_id}/{name}")
}

/// The lock payload for a pending membership request.
pub(crate) fn membership_payload(network_id: &NetworkId, party: &Party) -> String {
    format!("{network_id}/{}", party.name)
}

pub(crate) fn missing_output(what: &str) -> GroupsError {
    GroupsError::Submission(format!("finalized transaction carries no {what} output"))
}
