//! Shared fixtures for the contract integration tests.

#![allow(dead_code)]

use bnms_contracts::{
    Group, LedgerTransaction, Membership, StateAndRef, StateRef, TransactionState,
};
use bnms_crypto::keypair_from_seed;
use bnms_types::{
    KeyPair, MembershipIdentity, MembershipStatus, NetworkId, Party, PublicKey, Role, Timestamp,
    TxHash, UniqueIdentifier,
};

/// A party together with the key pair that signs for it.
pub struct Actor {
    pub keys: KeyPair,
    pub party: Party,
}

impl Actor {
    pub fn key(&self) -> PublicKey {
        self.party.owning_key.clone()
    }
}

pub fn actor(seed: u8, name: &str) -> Actor {
    let keys = keypair_from_seed(&[seed; 32]);
    let party = Party::new(name, keys.public.clone()).expect("valid party");
    Actor { keys, party }
}

pub fn operator() -> Actor {
    actor(1, "O=Operator,L=London,C=GB")
}

pub fn alice() -> Actor {
    actor(2, "O=Alice,L=Paris,C=FR")
}

pub fn carol() -> Actor {
    actor(3, "O=Carol,L=Berlin,C=DE")
}

pub fn network() -> NetworkId {
    NetworkId::new("network-1").expect("valid network id")
}

pub fn parties(actors: &[&Actor]) -> std::collections::BTreeSet<Party> {
    actors.iter().map(|a| a.party.clone()).collect()
}

pub fn membership(
    owner: &Actor,
    status: MembershipStatus,
    roles: Vec<Role>,
    participants: &[&Actor],
) -> Membership {
    Membership {
        identity: MembershipIdentity::new(owner.party.clone()),
        network_id: network(),
        status,
        roles: roles.into_iter().collect(),
        linear_id: UniqueIdentifier::random(),
        issuer: owner.party.clone(),
        issued: Timestamp::new(100),
        modified: Timestamp::new(100),
        participants: parties(participants),
    }
}

/// The operator's active membership, usable as a reference state.
pub fn operator_membership(op: &Actor) -> Membership {
    membership(op, MembershipStatus::Active, vec![Role::operator()], &[op])
}

pub fn group(issuer: &Actor, name: Option<&str>, participants: &[&Actor]) -> Group {
    Group {
        network_id: network(),
        name: name.map(str::to_owned),
        linear_id: UniqueIdentifier::random(),
        issuer: issuer.party.clone(),
        issued: Timestamp::new(100),
        modified: Timestamp::new(100),
        participants: parties(participants),
    }
}

/// `state` as if it were recorded as output `index` of an earlier transaction.
pub fn recorded(state: TransactionState, index: u32) -> StateAndRef {
    StateAndRef {
        state,
        reference: StateRef {
            tx_id: TxHash::new([0xAB; 32]),
            index,
        },
    }
}

pub fn signed(mut tx: LedgerTransaction, signers: &[&Actor]) -> LedgerTransaction {
    for signer in signers {
        tx.sign(&signer.keys);
    }
    tx
}
