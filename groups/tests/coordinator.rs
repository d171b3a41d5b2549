//! End-to-end issuance through the coordinators, over the nullable ledger
//! and lock store.

use std::collections::BTreeSet;
use std::sync::Arc;

use bnms_contracts::{AuthorizationError, ValidationError};
use bnms_crypto::keypair_from_seed;
use bnms_dedup::{DuplicateRequestError, LockKind, RequestLock, RequestLocks};
use bnms_groups::{
    BootstrapNetwork, CreateGroup, GroupsError, ModifyGroup, NetworkCoordinator, QueryService,
    RequestMembership, ServiceConfig,
};
use bnms_nullables::{NullClock, NullLedger, NullLockStore};
use bnms_types::{
    BusinessIdentity, MembershipStatus, NetworkId, Party, Role, Timestamp, UniqueIdentifier,
};
use tokio::sync::Notify;

type Coordinator = NetworkCoordinator<NullLedger, NullLedger, NullLockStore>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Network {
    ledger: Arc<NullLedger>,
    clock: Arc<NullClock>,
    store: Arc<NullLockStore>,
}

impl Network {
    fn new() -> Self {
        Self::with_ledger(NullLedger::new())
    }

    fn with_ledger(ledger: NullLedger) -> Self {
        Self {
            ledger: Arc::new(ledger),
            clock: Arc::new(NullClock::new(1_000)),
            store: Arc::new(NullLockStore::new()),
        }
    }

    /// A coordinator for a party whose key the ledger can also sign with.
    fn node(&self, seed: u8, name: &str) -> Coordinator {
        self.ledger.register(keypair_from_seed(&[seed; 32]));
        let locks = RequestLocks::with_clock(Arc::clone(&self.store), self.clock.clone());
        NetworkCoordinator::new(
            name,
            keypair_from_seed(&[seed; 32]),
            Arc::clone(&self.ledger),
            Arc::clone(&self.ledger),
            locks,
        )
        .expect("valid party")
        .with_clock(self.clock.clone())
    }
}

fn network_id() -> NetworkId {
    NetworkId::new("trade-finance").unwrap()
}

async fn bootstrap(op: &Coordinator) -> NetworkId {
    op.bootstrap_network(BootstrapNetwork {
        network_id: Some(network_id()),
        group_name: Some("default".into()),
        ..BootstrapNetwork::default()
    })
    .await
    .expect("bootstrap")
    .network_id
}

/// `member` requests to join and `op` activates it.
async fn join(op: &Coordinator, member: &Coordinator, network_id: &NetworkId) {
    member
        .request_membership(RequestMembership {
            network_id: network_id.clone(),
            operator: op.identity().clone(),
            business_identity: None,
        })
        .await
        .expect("request");
    op.activate_membership(network_id, member.identity())
        .await
        .expect("activate");
}

fn status_of(ledger: &NullLedger, network_id: &NetworkId, party: &Party) -> Option<MembershipStatus> {
    ledger
        .membership(network_id, party)
        .unwrap()
        .and_then(|s| s.membership().map(|m| m.status))
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bootstrap_issues_operator_membership_and_group() {
    let net = Network::new();
    let op = net.node(1, "O=Operator,L=London,C=GB");

    let result = op
        .bootstrap_network(BootstrapNetwork {
            group_name: Some("default".into()),
            business_identity: Some(BusinessIdentity::new("lei")),
            ..BootstrapNetwork::default()
        })
        .await
        .unwrap();

    let membership = result.membership.membership().unwrap();
    assert_eq!(membership.owner(), op.identity());
    assert!(membership.is_active());
    assert!(membership.is_operator());
    assert!(membership.business_identity().is_some());
    let group = result.group.group().unwrap();
    assert_eq!(group.name.as_deref(), Some("default"));
    assert_eq!(group.network_id, result.network_id);

    assert_eq!(net.ledger.transactions().len(), 1);
    assert!(net.ledger.network_exists(&result.network_id).unwrap());
    assert!(op.locks().held_locks().unwrap().is_empty());
}

#[tokio::test]
async fn bootstrapping_existing_network_is_rejected() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    bootstrap(&op).await;

    let err = op
        .bootstrap_network(BootstrapNetwork {
            network_id: Some(network_id()),
            ..BootstrapNetwork::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GroupsError::AlreadyExists(_)));
    assert_eq!(net.ledger.proposals(), 1);
}

#[tokio::test]
async fn bootstrap_uses_configured_network_id() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let config = ServiceConfig::from_toml_str("default_network_id = \"trade-finance\"").unwrap();

    let result = op
        .bootstrap_network(BootstrapNetwork::from_config(&config))
        .await
        .unwrap();
    assert_eq!(result.network_id, network_id());
    assert!(net.ledger.network_exists(&network_id()).unwrap());
}

#[tokio::test]
async fn concurrent_bootstrap_with_same_group_id_fails_at_lock() {
    let gate = Arc::new(Notify::new());
    let net = Network::with_ledger(NullLedger::new().with_signature_gate(Arc::clone(&gate)));
    let op = Arc::new(net.node(1, "O=Operator"));
    let group_id = UniqueIdentifier::random();

    let first = tokio::spawn({
        let op = Arc::clone(&op);
        let group_id = group_id.clone();
        async move {
            op.bootstrap_network(BootstrapNetwork {
                group_id: Some(group_id),
                ..BootstrapNetwork::default()
            })
            .await
        }
    });
    while net.ledger.proposals() == 0 {
        tokio::task::yield_now().await;
    }

    let err = op
        .bootstrap_network(BootstrapNetwork {
            group_id: Some(group_id.clone()),
            ..BootstrapNetwork::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GroupsError::Duplicate(DuplicateRequestError {
            kind: LockKind::GroupId,
            ..
        })
    ));
    // The second request never built a proposal.
    assert_eq!(net.ledger.proposals(), 1);

    gate.notify_one();
    let done = first.await.unwrap().unwrap();
    assert_eq!(done.group.group().unwrap().linear_id, group_id);
    assert!(op.locks().held_locks().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Membership lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requested_membership_is_pending_until_activated() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let network_id = bootstrap(&op).await;

    let requested = alice
        .request_membership(RequestMembership {
            network_id: network_id.clone(),
            operator: op.identity().clone(),
            business_identity: None,
        })
        .await
        .unwrap();
    assert!(requested.membership().unwrap().is_pending());

    op.activate_membership(&network_id, alice.identity())
        .await
        .unwrap();
    assert_eq!(
        status_of(&net.ledger, &network_id, alice.identity()),
        Some(MembershipStatus::Active)
    );
}

#[tokio::test]
async fn second_request_is_rejected() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let network_id = bootstrap(&op).await;
    let request = RequestMembership {
        network_id: network_id.clone(),
        operator: op.identity().clone(),
        business_identity: None,
    };

    alice.request_membership(request.clone()).await.unwrap();
    let err = alice.request_membership(request).await.unwrap_err();
    assert!(matches!(err, GroupsError::AlreadyExists(_)));
}

#[tokio::test]
async fn request_to_unknown_network_is_rejected() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");

    let err = alice
        .request_membership(RequestMembership {
            network_id: NetworkId::new("nowhere").unwrap(),
            operator: op.identity().clone(),
            business_identity: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GroupsError::NotFound(_)));
}

#[tokio::test]
async fn member_without_permission_cannot_activate() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let carol = net.node(3, "O=Carol");
    let network_id = bootstrap(&op).await;
    join(&op, &alice, &network_id).await;
    carol
        .request_membership(RequestMembership {
            network_id: network_id.clone(),
            operator: op.identity().clone(),
            business_identity: None,
        })
        .await
        .unwrap();

    let err = alice
        .activate_membership(&network_id, carol.identity())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GroupsError::Validation(ValidationError::Authorization(
            AuthorizationError::PermissionDenied(_)
        ))
    ));
    assert_eq!(
        status_of(&net.ledger, &network_id, carol.identity()),
        Some(MembershipStatus::Pending)
    );
}

#[tokio::test]
async fn operator_manages_member_lifecycle() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let network_id = bootstrap(&op).await;
    join(&op, &alice, &network_id).await;

    let promoted = op
        .modify_roles(&network_id, alice.identity(), BTreeSet::from([Role::member()]))
        .await
        .unwrap();
    assert_eq!(
        promoted.membership().unwrap().roles,
        BTreeSet::from([Role::member()])
    );

    let identified = op
        .modify_business_identity(
            &network_id,
            alice.identity(),
            Some(BusinessIdentity::new("lei").with_attribute("code", "529900T8BM49AURSDO55")),
        )
        .await
        .unwrap();
    assert!(identified.membership().unwrap().business_identity().is_some());

    op.suspend_membership(&network_id, alice.identity())
        .await
        .unwrap();
    assert_eq!(
        status_of(&net.ledger, &network_id, alice.identity()),
        Some(MembershipStatus::Suspended)
    );

    op.revoke_membership(&network_id, alice.identity())
        .await
        .unwrap();
    assert_eq!(status_of(&net.ledger, &network_id, alice.identity()), None);
}

#[tokio::test]
async fn member_widens_own_participants() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let carol = net.node(3, "O=Carol");
    let network_id = bootstrap(&op).await;
    join(&op, &alice, &network_id).await;

    let participants = BTreeSet::from([
        alice.identity().clone(),
        op.identity().clone(),
        carol.identity().clone(),
    ]);
    let widened = alice
        .modify_participants(&network_id, alice.identity(), participants.clone())
        .await
        .unwrap();
    assert_eq!(widened.membership().unwrap().participants, participants);
}

#[tokio::test]
async fn batch_activation_reports_each_party() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let stranger = net.node(4, "O=Stranger");
    let network_id = bootstrap(&op).await;
    alice
        .request_membership(RequestMembership {
            network_id: network_id.clone(),
            operator: op.identity().clone(),
            business_identity: None,
        })
        .await
        .unwrap();

    let outcome = op
        .activate_memberships(
            &network_id,
            vec![alice.identity().clone(), stranger.identity().clone()],
        )
        .await;

    assert_eq!(outcome.len(), 2);
    assert_eq!(&outcome[0].0, alice.identity());
    assert!(outcome[0].1.is_ok());
    assert_eq!(&outcome[1].0, stranger.identity());
    assert!(matches!(outcome[1].1, Err(GroupsError::NotFound(_))));
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn operator_creates_modifies_and_exits_group() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let alice = net.node(2, "O=Alice");
    let network_id = bootstrap(&op).await;
    join(&op, &alice, &network_id).await;

    let created = op
        .create_group(CreateGroup {
            network_id: network_id.clone(),
            group_id: None,
            name: Some("traders".into()),
            participants: vec![alice.identity().clone()],
        })
        .await
        .unwrap();
    let group = created.group().unwrap().clone();
    assert!(group.participants.contains(alice.identity()));
    assert!(group.participants.contains(op.identity()));

    net.clock.advance(30);
    let renamed = op
        .modify_group(
            &group.linear_id,
            ModifyGroup {
                name: Some("desk".into()),
                participants: None,
            },
        )
        .await
        .unwrap();
    let renamed = renamed.group().unwrap();
    assert_eq!(renamed.name.as_deref(), Some("desk"));
    assert_eq!(renamed.modified, Timestamp::new(1_030));

    op.exit_group(&group.linear_id).await.unwrap();
    assert!(net.ledger.group_by_id(&group.linear_id).unwrap().is_none());
}

#[tokio::test]
async fn group_name_must_be_unique_within_network() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let network_id = bootstrap(&op).await;

    let err = op
        .create_group(CreateGroup {
            network_id: network_id.clone(),
            group_id: None,
            name: Some("default".into()),
            participants: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GroupsError::AlreadyExists(_)));
}

#[tokio::test]
async fn custom_group_id_must_be_unused() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let network_id = bootstrap(&op).await;
    let group_id = UniqueIdentifier::random();
    let request = CreateGroup {
        network_id,
        group_id: Some(group_id.clone()),
        name: None,
        participants: vec![],
    };

    let created = op.create_group(request.clone()).await.unwrap();
    assert_eq!(created.group().unwrap().linear_id, group_id);
    let err = op.create_group(request).await.unwrap_err();
    assert!(matches!(err, GroupsError::AlreadyExists(_)));
}

#[tokio::test]
async fn group_participants_must_be_members() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let stranger = net.node(4, "O=Stranger");
    let network_id = bootstrap(&op).await;

    let err = op
        .create_group(CreateGroup {
            network_id,
            group_id: None,
            name: Some("traders".into()),
            participants: vec![stranger.identity().clone()],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GroupsError::NotFound(_)));
    assert_eq!(net.ledger.proposals(), 1);
}

#[tokio::test]
async fn group_modification_without_change_is_rejected() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let bootstrap = op
        .bootstrap_network(BootstrapNetwork {
            group_name: Some("default".into()),
            ..BootstrapNetwork::default()
        })
        .await
        .unwrap();
    let group_id = bootstrap.group.group().unwrap().linear_id.clone();

    let err = op
        .modify_group(
            &group_id,
            ModifyGroup {
                name: Some("default".into()),
                participants: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GroupsError::Validation(ValidationError::Rejected {
            command: "Group.Modify",
            ..
        })
    ));
    assert!(op.locks().held_locks().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Locks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reconcile_clears_leaked_locks() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    net.store
        .seed(RequestLock::new(LockKind::NetworkId, "crashed", Timestamp::new(0)));

    let config = ServiceConfig {
        lock_max_age_secs: 300,
        ..ServiceConfig::default()
    };
    let removed = op.reconcile_locks(&config).unwrap();
    assert_eq!(removed.len(), 1);
    assert!(net.store.is_empty());
}

#[tokio::test]
async fn unknown_counterparty_fails_submission_and_releases_locks() {
    let net = Network::new();
    let op = net.node(1, "O=Operator");
    let network_id = bootstrap(&op).await;

    // Dave's key is never registered with the ledger.
    let dave = NetworkCoordinator::new(
        "O=Dave",
        keypair_from_seed(&[9; 32]),
        Arc::clone(&net.ledger),
        Arc::clone(&net.ledger),
        RequestLocks::new(Arc::clone(&net.store)),
    )
    .unwrap();
    dave.request_membership(RequestMembership {
        network_id: network_id.clone(),
        operator: op.identity().clone(),
        business_identity: None,
    })
    .await
    .unwrap();

    let err = op
        .activate_membership(&network_id, dave.identity())
        .await
        .unwrap_err();
    assert!(matches!(err, GroupsError::Submission(_)));
    assert!(net.store.is_empty());
}
