//! Contract dispatch: run every contract a transaction's states name.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::ValidationError;
use crate::group::GroupContract;
use crate::membership::MembershipContract;
use crate::state::ContractId;
use crate::transaction::LedgerTransaction;

/// A deterministic verifier for the states it governs.
///
/// Implementations must be pure: the same transaction always yields the same
/// verdict, on every party.
pub trait Contract: Send + Sync {
    fn verify(&self, tx: &LedgerTransaction) -> Result<(), ValidationError>;
}

/// Maps contract ids to their implementations.
#[derive(Clone, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<ContractId, Arc<dyn Contract>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard group and membership contracts.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(ContractId::group(), GroupContract::new());
        registry.register(ContractId::membership(), MembershipContract::new());
        registry
    }

    /// Register (or replace) the contract governing states tagged `id`.
    pub fn register(&mut self, id: ContractId, contract: impl Contract + 'static) {
        self.contracts.insert(id, Arc::new(contract));
    }

    pub fn get(&self, id: &ContractId) -> Option<&Arc<dyn Contract>> {
        self.contracts.get(id)
    }

    /// Verify `tx` against every contract named by one of its inputs or outputs.
    ///
    /// Each contract runs once, in contract-id order; the first failure wins.
    pub fn verify(&self, tx: &LedgerTransaction) -> Result<(), ValidationError> {
        let named: BTreeSet<&ContractId> = tx
            .inputs
            .iter()
            .map(|s| &s.state.contract)
            .chain(tx.outputs.iter().map(|s| &s.contract))
            .collect();

        for id in named {
            let contract = self
                .contracts
                .get(id)
                .ok_or_else(|| ValidationError::UnknownContract(id.clone()))?;
            if let Err(e) = contract.verify(tx) {
                tracing::debug!(contract = %id, tx = %tx.id(), error = %e, "contract rejected transaction");
                return Err(e);
            }
        }
        Ok(())
    }
}
