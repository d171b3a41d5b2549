use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bnms_contracts::{
    Command, ContractRegistry, Group, GroupCommand, LedgerTransaction, Membership,
    StateAndRef, StateRef, TransactionBuilder, TransactionState,
};
use bnms_crypto::keypair_from_seed;
use bnms_types::{
    KeyPair, MembershipIdentity, MembershipStatus, NetworkId, Party, Role, Timestamp, TxHash,
    UniqueIdentifier,
};

fn operator() -> (KeyPair, Party) {
    let keys = keypair_from_seed(&[7u8; 32]);
    let party = Party::new("O=Operator", keys.public.clone()).unwrap();
    (keys, party)
}

/// A signed group creation whose group lists `participant_count` parties.
fn create_group_tx(participant_count: usize) -> LedgerTransaction {
    let (keys, op) = operator();
    let network = NetworkId::new("bench").unwrap();
    let mut participants: std::collections::BTreeSet<Party> = (0..participant_count)
        .map(|i| {
            let kp = keypair_from_seed(&[(i % 250) as u8 + 1; 32]);
            Party::new(format!("O=Member{i}"), kp.public).unwrap()
        })
        .collect();
    participants.insert(op.clone());

    let initiator = Membership {
        identity: MembershipIdentity::new(op.clone()),
        network_id: network.clone(),
        status: MembershipStatus::Active,
        roles: [Role::operator()].into_iter().collect(),
        linear_id: UniqueIdentifier::random(),
        issuer: op.clone(),
        issued: Timestamp::new(1),
        modified: Timestamp::new(1),
        participants: [op.clone()].into_iter().collect(),
    };
    let group = Group {
        network_id: network,
        name: Some("bench".into()),
        linear_id: UniqueIdentifier::random(),
        issuer: op.clone(),
        issued: Timestamp::new(2),
        modified: Timestamp::new(2),
        participants,
    };

    let mut tx = TransactionBuilder::new()
        .output(TransactionState::group(group))
        .reference(StateAndRef {
            state: TransactionState::membership(initiator),
            reference: StateRef {
                tx_id: TxHash::new([1u8; 32]),
                index: 0,
            },
        })
        .command(Command::group(GroupCommand::Create, [op.owning_key.clone()]))
        .build();
    tx.sign(&keys);
    tx
}

fn bench_registry_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_verify");
    let registry = ContractRegistry::standard();

    for participant_count in [1, 10, 100] {
        let tx = create_group_tx(participant_count);
        group.bench_with_input(
            BenchmarkId::new("group_create", participant_count),
            &participant_count,
            |b, _| {
                b.iter(|| black_box(registry.verify(black_box(&tx))));
            },
        );
    }

    group.finish();
}

fn bench_transaction_id(c: &mut Criterion) {
    let tx = create_group_tx(10);
    c.bench_function("transaction_id", |b| b.iter(|| black_box(tx.id())));
}

criterion_group!(benches, bench_registry_verify, bench_transaction_id);
criterion_main!(benches);
