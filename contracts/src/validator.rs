//! Initiator authorization shared by the lifecycle contracts.

use bnms_types::{NetworkId, Party, PublicKey};
use std::collections::BTreeSet;

use crate::error::{AuthorizationError, ValidationError};
use crate::state::Membership;
use crate::transaction::LedgerTransaction;

/// Find the membership that initiated `tx`.
///
/// The initiator is the single reference state when the transaction carries
/// references, otherwise the single input. Anything else means the caller
/// assembled the transaction wrongly.
pub fn resolve_initiator(tx: &LedgerTransaction) -> Result<&Membership, ValidationError> {
    let (source, candidates) = if tx.references.is_empty() {
        ("input", &tx.inputs)
    } else {
        ("reference", &tx.references)
    };
    match candidates.as_slice() {
        [single] => single.membership().ok_or_else(|| {
            ValidationError::InitiatorUnresolved(format!("{source} state is not a membership"))
        }),
        other => Err(ValidationError::InitiatorUnresolved(format!(
            "expected exactly one {source} state, found {}",
            other.len()
        ))),
    }
}

/// Verify that the transaction's initiator may perform this change.
///
/// The initiator must belong to `network_id`, be active, satisfy
/// `is_authorized`, be among `participants` of the evolved state, and its key
/// must be one of `required_signers`.
pub fn verify_initiator<'a>(
    tx: &'a LedgerTransaction,
    network_id: &NetworkId,
    participants: &BTreeSet<Party>,
    required_signers: &BTreeSet<PublicKey>,
    is_authorized: impl Fn(&Membership) -> bool,
) -> Result<&'a Membership, ValidationError> {
    let initiator = resolve_initiator(tx)?;
    let owner = initiator.owner();

    if &initiator.network_id != network_id {
        return Err(AuthorizationError::WrongNetwork {
            expected: network_id.clone(),
            actual: initiator.network_id.clone(),
        }
        .into());
    }
    if !initiator.is_active() {
        return Err(AuthorizationError::NotActive {
            party: owner.name.clone(),
            status: initiator.status,
        }
        .into());
    }
    if !is_authorized(initiator) {
        return Err(AuthorizationError::PermissionDenied(owner.name.clone()).into());
    }
    if !participants.contains(owner) {
        return Err(AuthorizationError::NotParticipant(owner.name.clone()).into());
    }
    if !required_signers.contains(&owner.owning_key) {
        return Err(AuthorizationError::NotRequiredSigner(owner.name.clone()).into());
    }
    Ok(initiator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Group, StateAndRef, StateRef, TransactionState};
    use crate::transaction::TransactionBuilder;
    use bnms_crypto::keypair_from_seed;
    use bnms_types::{
        MembershipIdentity, MembershipStatus, Role, Timestamp, TxHash, UniqueIdentifier,
    };

    fn party(seed: u8, name: &str) -> Party {
        Party::new(name, keypair_from_seed(&[seed; 32]).public).unwrap()
    }

    fn network() -> NetworkId {
        NetworkId::new("net-1").unwrap()
    }

    fn membership(owner: Party, status: MembershipStatus, roles: Vec<Role>) -> Membership {
        Membership {
            identity: MembershipIdentity::new(owner.clone()),
            network_id: network(),
            status,
            roles: roles.into_iter().collect(),
            linear_id: UniqueIdentifier::random(),
            issuer: owner.clone(),
            issued: Timestamp::new(10),
            modified: Timestamp::new(10),
            participants: [owner].into_iter().collect(),
        }
    }

    fn recorded(state: TransactionState, index: u32) -> StateAndRef {
        StateAndRef {
            state,
            reference: StateRef {
                tx_id: TxHash::new([index as u8 + 1; 32]),
                index,
            },
        }
    }

    fn tx_with_reference(initiator: Membership) -> LedgerTransaction {
        TransactionBuilder::new()
            .reference(recorded(TransactionState::membership(initiator), 0))
            .build()
    }

    fn signers(party: &Party) -> BTreeSet<PublicKey> {
        [party.owning_key.clone()].into_iter().collect()
    }

    fn participants(parties: &[&Party]) -> BTreeSet<Party> {
        parties.iter().map(|p| (*p).clone()).collect()
    }

    #[test]
    fn active_operator_in_participants_is_authorized() {
        let bno = party(1, "O=BNO");
        let tx = tx_with_reference(membership(bno.clone(), MembershipStatus::Active, vec![Role::operator()]));
        let initiator = verify_initiator(
            &tx,
            &network(),
            &participants(&[&bno]),
            &signers(&bno),
            Membership::can_modify_groups,
        )
        .unwrap();
        assert_eq!(initiator.owner(), &bno);
    }

    #[test]
    fn initiator_outside_participants_is_rejected() {
        let bno = party(1, "O=BNO");
        let other = party(2, "O=Other");
        let tx = tx_with_reference(membership(bno.clone(), MembershipStatus::Active, vec![Role::operator()]));
        let err = verify_initiator(
            &tx,
            &network(),
            &participants(&[&other]),
            &signers(&bno),
            Membership::can_modify_groups,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Authorization(AuthorizationError::NotParticipant(_))
        ));
    }

    #[test]
    fn wrong_network_is_rejected() {
        let bno = party(1, "O=BNO");
        let tx = tx_with_reference(membership(bno.clone(), MembershipStatus::Active, vec![Role::operator()]));
        let err = verify_initiator(
            &tx,
            &NetworkId::new("net-2").unwrap(),
            &participants(&[&bno]),
            &signers(&bno),
            Membership::can_modify_groups,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Authorization(AuthorizationError::WrongNetwork { .. })
        ));
    }

    #[test]
    fn suspended_initiator_is_rejected() {
        let bno = party(1, "O=BNO");
        let tx = tx_with_reference(membership(bno.clone(), MembershipStatus::Suspended, vec![Role::operator()]));
        let err = verify_initiator(
            &tx,
            &network(),
            &participants(&[&bno]),
            &signers(&bno),
            Membership::can_modify_groups,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Authorization(AuthorizationError::NotActive { .. })
        ));
    }

    #[test]
    fn predicate_failure_is_permission_denied() {
        let member = party(3, "O=Member");
        let tx = tx_with_reference(membership(member.clone(), MembershipStatus::Active, vec![Role::member()]));
        let err = verify_initiator(
            &tx,
            &network(),
            &participants(&[&member]),
            &signers(&member),
            Membership::can_modify_groups,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Authorization(AuthorizationError::PermissionDenied(_))
        ));
    }

    #[test]
    fn initiator_not_required_signer_is_rejected() {
        let bno = party(1, "O=BNO");
        let other = party(2, "O=Other");
        let tx = tx_with_reference(membership(bno.clone(), MembershipStatus::Active, vec![Role::operator()]));
        let err = verify_initiator(
            &tx,
            &network(),
            &participants(&[&bno]),
            &signers(&other),
            Membership::can_modify_groups,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Authorization(AuthorizationError::NotRequiredSigner(_))
        ));
    }

    #[test]
    fn falls_back_to_single_input_without_references() {
        let bno = party(1, "O=BNO");
        let tx = TransactionBuilder::new()
            .input(recorded(
                TransactionState::membership(membership(bno.clone(), MembershipStatus::Active, vec![Role::operator()])),
                0,
            ))
            .build();
        assert_eq!(resolve_initiator(&tx).unwrap().owner(), &bno);
    }

    #[test]
    fn non_membership_source_is_unresolved() {
        let bno = party(1, "O=BNO");
        let group = Group {
            network_id: network(),
            name: None,
            linear_id: UniqueIdentifier::random(),
            issuer: bno.clone(),
            issued: Timestamp::new(1),
            modified: Timestamp::new(1),
            participants: participants(&[&bno]),
        };
        let tx = TransactionBuilder::new()
            .input(recorded(TransactionState::group(group), 0))
            .build();
        assert!(matches!(
            resolve_initiator(&tx),
            Err(ValidationError::InitiatorUnresolved(_))
        ));
    }

    #[test]
    fn empty_transaction_is_unresolved() {
        let tx = LedgerTransaction::default();
        assert!(matches!(
            resolve_initiator(&tx),
            Err(ValidationError::InitiatorUnresolved(_))
        ));
    }
}
