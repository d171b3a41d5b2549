//! Structural checks shared by every lifecycle contract.
//!
//! These run before any command-specific rule and cannot be overridden by a
//! specialised contract.

use bnms_types::{NetworkId, Party, Timestamp, UniqueIdentifier};
use std::collections::BTreeSet;

use crate::command::Command;
use crate::error::{EntityKind, ValidationError};
use crate::state::{ContractId, ContractState, Group, Membership, TransactionState};
use crate::transaction::LedgerTransaction;

/// A ledger entity that evolves through versions under one linear id.
pub trait LinearEntity {
    const KIND: EntityKind;

    fn from_state(state: &ContractState) -> Option<&Self>;
    fn network_id(&self) -> &NetworkId;
    fn linear_id(&self) -> &UniqueIdentifier;
    fn issuer(&self) -> &Party;
    fn issued(&self) -> Timestamp;
    fn modified(&self) -> Timestamp;
    fn participants(&self) -> &BTreeSet<Party>;
}

impl LinearEntity for Group {
    const KIND: EntityKind = EntityKind::Group;

    fn from_state(state: &ContractState) -> Option<&Self> {
        state.as_group()
    }
    fn network_id(&self) -> &NetworkId {
        &self.network_id
    }
    fn linear_id(&self) -> &UniqueIdentifier {
        &self.linear_id
    }
    fn issuer(&self) -> &Party {
        &self.issuer
    }
    fn issued(&self) -> Timestamp {
        self.issued
    }
    fn modified(&self) -> Timestamp {
        self.modified
    }
    fn participants(&self) -> &BTreeSet<Party> {
        &self.participants
    }
}

impl LinearEntity for Membership {
    const KIND: EntityKind = EntityKind::Membership;

    fn from_state(state: &ContractState) -> Option<&Self> {
        state.as_membership()
    }
    fn network_id(&self) -> &NetworkId {
        &self.network_id
    }
    fn linear_id(&self) -> &UniqueIdentifier {
        &self.linear_id
    }
    fn issuer(&self) -> &Party {
        &self.issuer
    }
    fn issued(&self) -> Timestamp {
        self.issued
    }
    fn modified(&self) -> Timestamp {
        self.modified
    }
    fn participants(&self) -> &BTreeSet<Party> {
        &self.participants
    }
}

/// The prior and new version of the entity under validation, when present.
#[derive(Debug)]
pub struct Evolution<'a, E> {
    pub input: Option<&'a E>,
    pub output: Option<&'a E>,
}

/// Run the fixed structural rules for entity kind `E`.
///
/// `multiple_allowed` lifts the single-input/single-output restriction (used
/// by bootstrap, which co-issues several states).
pub fn verify_structure<'a, E: LinearEntity>(
    tx: &'a LedgerTransaction,
    command: &Command,
    contract_id: &ContractId,
    multiple_allowed: bool,
) -> Result<Evolution<'a, E>, ValidationError> {
    let inputs: Vec<&TransactionState> = tx.inputs_of(E::KIND).map(|s| &s.state).collect();
    let outputs: Vec<&TransactionState> = tx.outputs_of(E::KIND).collect();

    if !multiple_allowed && inputs.len() > 1 {
        return Err(ValidationError::TooManyInputs {
            entity: E::KIND,
            count: inputs.len(),
        });
    }
    if !multiple_allowed && outputs.len() > 1 {
        return Err(ValidationError::TooManyOutputs {
            entity: E::KIND,
            count: outputs.len(),
        });
    }

    match tx.references.as_slice() {
        [] => {}
        [reference] => {
            if reference.membership().is_none() {
                return Err(ValidationError::ReferenceNotMembership);
            }
        }
        many => return Err(ValidationError::TooManyReferences(many.len())),
    }

    for state in inputs.iter().chain(outputs.iter()) {
        if &state.contract != contract_id {
            return Err(ValidationError::WrongContract {
                entity: E::KIND,
                expected: contract_id.clone(),
                actual: state.contract.clone(),
            });
        }
    }

    let input = inputs.first().copied().and_then(|s| E::from_state(&s.data));
    let output = outputs.first().copied().and_then(|s| E::from_state(&s.data));

    for entity in inputs
        .iter()
        .chain(outputs.iter())
        .filter_map(|s| E::from_state(&s.data))
    {
        if entity.issued() > entity.modified() {
            return Err(ValidationError::IssuedAfterModified {
                entity: E::KIND,
                issued: entity.issued(),
                modified: entity.modified(),
            });
        }
    }

    if let (Some(input), Some(output)) = (input, output) {
        verify_evolution(input, output)?;
    }

    verify_signers(tx, command)?;

    Ok(Evolution { input, output })
}

/// Immutability and monotonicity between two versions of the same entity.
pub fn verify_evolution<E: LinearEntity>(input: &E, output: &E) -> Result<(), ValidationError> {
    let immutable = |field: &'static str| ValidationError::ImmutableFieldChanged {
        entity: E::KIND,
        field,
    };
    if input.network_id() != output.network_id() {
        return Err(immutable("network_id"));
    }
    if input.issued() != output.issued() {
        return Err(immutable("issued"));
    }
    if input.issuer() != output.issuer() {
        return Err(immutable("issuer"));
    }
    if output.modified() < input.modified() {
        return Err(ValidationError::ModifiedDecreased {
            entity: E::KIND,
            input: input.modified(),
            output: output.modified(),
        });
    }
    if input.linear_id() != output.linear_id() {
        return Err(immutable("linear_id"));
    }
    Ok(())
}

/// The keys that actually signed must be exactly the command's required signers.
pub fn verify_signers(tx: &LedgerTransaction, command: &Command) -> Result<(), ValidationError> {
    let actual = tx.signers();
    if actual == command.signers {
        return Ok(());
    }
    Err(ValidationError::SignerMismatch {
        missing: command.signers.difference(&actual).cloned().collect(),
        unexpected: actual.difference(&command.signers).cloned().collect(),
    })
}
