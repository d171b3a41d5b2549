use bnms_types::{MembershipStatus, NetworkId, PublicKey, Timestamp};
use std::fmt;
use thiserror::Error;

use crate::state::ContractId;

/// Which kind of ledger entity a check was about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Group,
    Membership,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("group"),
            Self::Membership => f.write_str("membership"),
        }
    }
}

/// The initiating membership is not allowed to perform the transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("initiator belongs to network {actual}, expected {expected}")]
    WrongNetwork {
        expected: NetworkId,
        actual: NetworkId,
    },

    #[error("initiator {party} is not active (status {status})")]
    NotActive {
        party: String,
        status: MembershipStatus,
    },

    #[error("initiator {0} does not hold the required permission")]
    PermissionDenied(String),

    #[error("initiator {0} is not a participant of the evolved state")]
    NotParticipant(String),

    #[error("initiator {0} is not a required signer of the command")]
    NotRequiredSigner(String),
}

/// A proposed transaction violates a structural or business rule.
///
/// Always fatal to the proposal; retrying the same contents cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("transaction carries no {0} command")]
    MissingCommand(EntityKind),

    #[error("transaction carries {count} {entity} commands, expected one")]
    MultipleCommands { entity: EntityKind, count: usize },

    #[error("{entity} transaction has {count} {entity} inputs, at most one allowed")]
    TooManyInputs { entity: EntityKind, count: usize },

    #[error("{entity} transaction has {count} {entity} outputs, at most one allowed")]
    TooManyOutputs { entity: EntityKind, count: usize },

    #[error("transaction has {0} reference states, at most one allowed")]
    TooManyReferences(usize),

    #[error("reference state must be a membership")]
    ReferenceNotMembership,

    #[error("{entity} state is governed by {actual}, expected {expected}")]
    WrongContract {
        entity: EntityKind,
        expected: ContractId,
        actual: ContractId,
    },

    #[error("{entity} issued at {issued} after it was modified at {modified}")]
    IssuedAfterModified {
        entity: EntityKind,
        issued: Timestamp,
        modified: Timestamp,
    },

    #[error("{entity} field `{field}` must not change")]
    ImmutableFieldChanged {
        entity: EntityKind,
        field: &'static str,
    },

    #[error("{entity} modified timestamp went backwards: {input} -> {output}")]
    ModifiedDecreased {
        entity: EntityKind,
        input: Timestamp,
        output: Timestamp,
    },

    #[error("transaction signers do not match command signers (missing {missing:?}, unexpected {unexpected:?})")]
    SignerMismatch {
        missing: Vec<PublicKey>,
        unexpected: Vec<PublicKey>,
    },

    #[error("{command}: {reason}")]
    Rejected {
        command: &'static str,
        reason: String,
    },

    #[error("cannot resolve initiator: {0}")]
    InitiatorUnresolved(String),

    #[error("no contract registered under {0}")]
    UnknownContract(ContractId),
}

/// Fail with [`ValidationError::Rejected`] unless `condition` holds.
pub fn require(
    condition: bool,
    command: &'static str,
    reason: impl Into<String>,
) -> Result<(), ValidationError> {
    if condition {
        Ok(())
    } else {
        Err(ValidationError::Rejected {
            command,
            reason: reason.into(),
        })
    }
}
