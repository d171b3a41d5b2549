//! Business network bootstrap.

use std::collections::BTreeSet;

use bnms_contracts::{
    Command, Group, GroupCommand, Membership, MembershipCommand, StateAndRef, TransactionBuilder,
    TransactionState,
};
use bnms_dedup::{LockKind, LockStore};
use bnms_types::{
    BusinessIdentity, MembershipIdentity, MembershipStatus, NetworkId, Role, TxHash,
    UniqueIdentifier,
};

use crate::config::ServiceConfig;
use crate::coordinator::{group_id_payload, missing_output, NetworkCoordinator};
use crate::error::GroupsError;
use crate::service::{IssuancePhase, QueryService, SubmissionService};

/// Parameters for creating a new business network.
#[derive(Clone, Debug, Default)]
pub struct BootstrapNetwork {
    /// Chosen network id; random when absent.
    pub network_id: Option<NetworkId>,
    /// Chosen id for the initial group; random when absent.
    pub group_id: Option<UniqueIdentifier>,
    pub group_name: Option<String>,
    pub business_identity: Option<BusinessIdentity>,
}

impl BootstrapNetwork {
    /// Bootstrap the network named by `config.default_network_id`, or a
    /// random one when none is configured.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            network_id: config.default_network_id.clone(),
            ..Self::default()
        }
    }
}

/// The states recorded by a bootstrap.
#[derive(Clone, Debug)]
pub struct NetworkBootstrap {
    pub tx_id: TxHash,
    pub network_id: NetworkId,
    pub membership: StateAndRef,
    pub group: StateAndRef,
}

impl<Q, T, L> NetworkCoordinator<Q, T, L>
where
    Q: QueryService,
    T: SubmissionService,
    L: LockStore,
{
    /// Create a network with this party as its operator.
    ///
    /// Co-issues the operator's active membership and the network's initial
    /// group in one transaction.
    pub async fn bootstrap_network(
        &self,
        request: BootstrapNetwork,
    ) -> Result<NetworkBootstrap, GroupsError> {
        let network_id = request.network_id.unwrap_or_else(NetworkId::random);

        tracing::debug!(network = %network_id, phase = %IssuancePhase::CheckingConflicts, "bootstrapping network");
        if self.query.network_exists(&network_id)? {
            return Err(GroupsError::AlreadyExists(format!("network {network_id}")));
        }
        if let Some(id) = &request.group_id {
            if self.query.group_by_id(id)?.is_some() {
                return Err(GroupsError::AlreadyExists(format!("group {id}")));
            }
        }

        let _network_lock = self.lock(LockKind::NetworkId, network_id.as_str())?;
        let _group_lock = match &request.group_id {
            Some(id) => Some(self.lock(LockKind::GroupId, &group_id_payload(id))?),
            None => None,
        };

        tracing::debug!(network = %network_id, phase = %IssuancePhase::Building, "building bootstrap");
        let now = self.now();
        let us = self.identity.clone();
        let mut identity = MembershipIdentity::new(us.clone());
        if let Some(business_identity) = request.business_identity {
            identity = identity.with_business_identity(business_identity);
        }
        let membership = Membership {
            identity,
            network_id: network_id.clone(),
            status: MembershipStatus::Active,
            roles: BTreeSet::from([Role::operator()]),
            linear_id: UniqueIdentifier::random(),
            issuer: us.clone(),
            issued: now,
            modified: now,
            participants: BTreeSet::from([us.clone()]),
        };
        let group = Group {
            network_id: network_id.clone(),
            name: request.group_name,
            linear_id: request.group_id.unwrap_or_else(UniqueIdentifier::random),
            issuer: us.clone(),
            issued: now,
            modified: now,
            participants: BTreeSet::from([us.clone()]),
        };
        let tx = TransactionBuilder::new()
            .output(TransactionState::membership(membership))
            .output(TransactionState::group(group))
            .command(Command::membership(
                MembershipCommand::Bootstrap,
                [us.owning_key.clone()],
            ))
            .command(Command::group(GroupCommand::Bootstrap, [us.owning_key]))
            .build();

        let record = self.submit(tx).await?;
        let membership = record
            .membership()
            .cloned()
            .ok_or_else(|| missing_output("membership"))?;
        let group = record.group().cloned().ok_or_else(|| missing_output("group"))?;
        Ok(NetworkBootstrap {
            tx_id: record.tx_id,
            network_id,
            membership,
            group,
        })
    }
}
