//! Nullable ledger: an in-process stand-in for the ledger platform.
//!
//! Answers state queries, signs on behalf of registered counterparties and
//! finalises transactions the way a notarised ledger would: every contract
//! must accept, and inputs and references must still be unconsumed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bnms_contracts::{
    ContractRegistry, LedgerTransaction, StateAndRef, StateRef, TransactionState,
};
use bnms_groups::{FinalizedRecord, GroupsError, QueryService, SubmissionService};
use bnms_store::StoreError;
use bnms_types::{KeyPair, NetworkId, Party, PublicKey, TxHash, UniqueIdentifier};
use tokio::sync::Notify;

#[derive(Default)]
struct LedgerInner {
    unconsumed: BTreeMap<StateRef, TransactionState>,
    transactions: Vec<LedgerTransaction>,
    seeded: u32,
}

/// An in-memory ledger shared by every coordinator in a test.
pub struct NullLedger {
    inner: Mutex<LedgerInner>,
    keyring: Mutex<BTreeMap<PublicKey, KeyPair>>,
    contracts: ContractRegistry,
    signature_gate: Option<Arc<Notify>>,
    proposals: AtomicUsize,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerInner::default()),
            keyring: Mutex::new(BTreeMap::new()),
            contracts: ContractRegistry::standard(),
            signature_gate: None,
            proposals: AtomicUsize::new(0),
        }
    }

    /// Hold every signature collection until `gate` is notified once per proposal.
    pub fn with_signature_gate(mut self, gate: Arc<Notify>) -> Self {
        self.signature_gate = Some(gate);
        self
    }

    /// Finalise with `contracts` instead of the standard registry.
    pub fn with_contracts(mut self, contracts: ContractRegistry) -> Self {
        self.contracts = contracts;
        self
    }

    /// Let the ledger sign as the holder of `keys` when its signature is required.
    pub fn register(&self, keys: KeyPair) {
        self.keyring
            .lock()
            .unwrap()
            .insert(keys.public.clone(), keys);
    }

    /// Record `state` as if an earlier transaction had produced it.
    pub fn seed(&self, state: TransactionState) -> StateAndRef {
        let mut inner = self.inner.lock().unwrap();
        inner.seeded += 1;
        let reference = StateRef {
            tx_id: TxHash::ZERO,
            index: inner.seeded,
        };
        inner.unconsumed.insert(reference, state.clone());
        StateAndRef { state, reference }
    }

    /// How many proposals reached signature collection.
    pub fn proposals(&self) -> usize {
        self.proposals.load(Ordering::SeqCst)
    }

    /// Every finalised transaction, oldest first.
    pub fn transactions(&self) -> Vec<LedgerTransaction> {
        self.inner.lock().unwrap().transactions.clone()
    }

    /// Snapshot of all unconsumed states.
    pub fn states(&self) -> Vec<StateAndRef> {
        self.inner
            .lock()
            .unwrap()
            .unconsumed
            .iter()
            .map(|(reference, state)| StateAndRef {
                state: state.clone(),
                reference: *reference,
            })
            .collect()
    }

    fn record(&self, tx: LedgerTransaction) -> Result<FinalizedRecord, GroupsError> {
        let tx_id = tx.id();
        let mut inner = self.inner.lock().unwrap();

        for consumed in tx.inputs.iter().chain(tx.references.iter()) {
            if inner.unconsumed.get(&consumed.reference) != Some(&consumed.state) {
                return Err(GroupsError::Submission(format!(
                    "state {} is not current",
                    consumed.reference
                )));
            }
        }
        for input in &tx.inputs {
            inner.unconsumed.remove(&input.reference);
        }

        let outputs: Vec<StateAndRef> = tx
            .outputs
            .iter()
            .enumerate()
            .map(|(index, state)| StateAndRef {
                state: state.clone(),
                reference: StateRef {
                    tx_id,
                    index: index as u32,
                },
            })
            .collect();
        for output in &outputs {
            inner
                .unconsumed
                .insert(output.reference, output.state.clone());
        }
        inner.transactions.push(tx);

        Ok(FinalizedRecord { tx_id, outputs })
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryService for NullLedger {
    fn group_by_id(&self, linear_id: &UniqueIdentifier) -> Result<Option<StateAndRef>, StoreError> {
        Ok(self
            .states()
            .into_iter()
            .find(|s| s.group().is_some_and(|g| g.linear_id.id == linear_id.id)))
    }

    fn groups_by_name(
        &self,
        network_id: &NetworkId,
        name: &str,
    ) -> Result<Vec<StateAndRef>, StoreError> {
        Ok(self
            .states()
            .into_iter()
            .filter(|s| {
                s.group().is_some_and(|g| {
                    &g.network_id == network_id && g.name.as_deref() == Some(name)
                })
            })
            .collect())
    }

    fn membership(
        &self,
        network_id: &NetworkId,
        party: &Party,
    ) -> Result<Option<StateAndRef>, StoreError> {
        Ok(self.states().into_iter().find(|s| {
            s.membership()
                .is_some_and(|m| &m.network_id == network_id && m.owner() == party)
        }))
    }

    fn memberships(&self, network_id: &NetworkId) -> Result<Vec<StateAndRef>, StoreError> {
        Ok(self
            .states()
            .into_iter()
            .filter(|s| s.membership().is_some_and(|m| &m.network_id == network_id))
            .collect())
    }

    fn network_exists(&self, network_id: &NetworkId) -> Result<bool, StoreError> {
        Ok(!self.memberships(network_id)?.is_empty())
    }
}

impl SubmissionService for NullLedger {
    async fn collect_signatures(
        &self,
        mut tx: LedgerTransaction,
    ) -> Result<LedgerTransaction, GroupsError> {
        self.proposals.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.signature_gate {
            gate.notified().await;
        }

        let required: BTreeSet<PublicKey> = tx
            .commands
            .iter()
            .flat_map(|c| c.signers.iter().cloned())
            .collect();
        let present = tx.signers();
        let keyring = self.keyring.lock().unwrap();
        for key in required.difference(&present) {
            let keys = keyring.get(key).ok_or_else(|| {
                GroupsError::Submission(format!("no counterparty signs for key {key}"))
            })?;
            tx.sign(keys);
        }
        Ok(tx)
    }

    async fn finalize(&self, tx: LedgerTransaction) -> Result<FinalizedRecord, GroupsError> {
        self.contracts.verify(&tx)?;
        self.record(tx)
    }
}
