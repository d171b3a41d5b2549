//! Group creation, modification and exit.

use std::collections::BTreeSet;

use bnms_contracts::{Command, Group, GroupCommand, StateAndRef, TransactionBuilder, TransactionState};
use bnms_dedup::{LockKind, LockStore};
use bnms_types::{NetworkId, Party, PublicKey, TxHash, UniqueIdentifier};

use crate::coordinator::{group_id_payload, group_name_payload, missing_output, NetworkCoordinator};
use crate::error::GroupsError;
use crate::service::{IssuancePhase, QueryService, SubmissionService};

/// Parameters for a new group in an existing network.
#[derive(Clone, Debug)]
pub struct CreateGroup {
    pub network_id: NetworkId,
    /// Chosen group id; random when absent.
    pub group_id: Option<UniqueIdentifier>,
    pub name: Option<String>,
    /// Members to include besides the creating party.
    pub participants: Vec<Party>,
}

/// Replacement values for a group; `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct ModifyGroup {
    pub name: Option<String>,
    pub participants: Option<BTreeSet<Party>>,
}

fn owning_keys<'a>(parties: impl IntoIterator<Item = &'a Party>) -> BTreeSet<PublicKey> {
    parties.into_iter().map(|p| p.owning_key.clone()).collect()
}

impl<Q, T, L> NetworkCoordinator<Q, T, L>
where
    Q: QueryService,
    T: SubmissionService,
    L: LockStore,
{
    /// Create a group. Every participant must already be a member of the network.
    pub async fn create_group(&self, request: CreateGroup) -> Result<StateAndRef, GroupsError> {
        let network_id = &request.network_id;

        tracing::debug!(network = %network_id, phase = %IssuancePhase::CheckingConflicts, "creating group");
        let initiator = self.membership_of(network_id, &self.identity)?;
        if let Some(id) = &request.group_id {
            if self.query.group_by_id(id)?.is_some() {
                return Err(GroupsError::AlreadyExists(format!("group {id}")));
            }
        }
        if let Some(name) = &request.name {
            self.ensure_name_free(network_id, name)?;
        }
        let mut participants = BTreeSet::from([self.identity.clone()]);
        for party in request.participants {
            self.membership_of(network_id, &party)?;
            participants.insert(party);
        }

        let _id_lock = match &request.group_id {
            Some(id) => Some(self.lock(LockKind::GroupId, &group_id_payload(id))?),
            None => None,
        };
        let _name_lock = match &request.name {
            Some(name) => Some(self.lock(LockKind::GroupName, &group_name_payload(network_id, name))?),
            None => None,
        };

        tracing::debug!(network = %network_id, phase = %IssuancePhase::Building, "building group creation");
        let now = self.now();
        let signers = owning_keys(&participants);
        let group = Group {
            network_id: network_id.clone(),
            name: request.name,
            linear_id: request.group_id.unwrap_or_else(UniqueIdentifier::random),
            issuer: self.identity.clone(),
            issued: now,
            modified: now,
            participants,
        };
        let tx = TransactionBuilder::new()
            .output(TransactionState::group(group))
            .reference(initiator)
            .command(Command::group(GroupCommand::Create, signers))
            .build();

        let record = self.submit(tx).await?;
        record.group().cloned().ok_or_else(|| missing_output("group"))
    }

    /// Rename a group or replace its participants.
    pub async fn modify_group(
        &self,
        group_id: &UniqueIdentifier,
        change: ModifyGroup,
    ) -> Result<StateAndRef, GroupsError> {
        let input = self.current_group(group_id)?;
        let current = input
            .group()
            .cloned()
            .ok_or_else(|| GroupsError::NotFound(format!("group {group_id}")))?;
        let network_id = current.network_id.clone();

        tracing::debug!(group = %group_id, phase = %IssuancePhase::CheckingConflicts, "modifying group");
        let initiator = self.membership_of(&network_id, &self.identity)?;
        let renamed = change
            .name
            .as_ref()
            .filter(|name| current.name.as_ref() != Some(*name));
        if let Some(name) = renamed {
            self.ensure_name_free(&network_id, name)?;
        }
        if let Some(participants) = &change.participants {
            for party in participants.difference(&current.participants) {
                self.membership_of(&network_id, party)?;
            }
        }

        let _name_lock = match renamed {
            Some(name) => Some(self.lock(LockKind::GroupName, &group_name_payload(&network_id, name))?),
            None => None,
        };

        tracing::debug!(group = %group_id, phase = %IssuancePhase::Building, "building group modification");
        let mut output = current.clone();
        if let Some(name) = change.name {
            output.name = Some(name);
        }
        if let Some(participants) = change.participants {
            output.participants = participants;
        }
        output.modified = self.now().max(current.modified);
        let signers = owning_keys(current.participants.union(&output.participants));

        let tx = TransactionBuilder::new()
            .input(input)
            .output(TransactionState::group(output))
            .reference(initiator)
            .command(Command::group(GroupCommand::Modify, signers))
            .build();

        let record = self.submit(tx).await?;
        record.group().cloned().ok_or_else(|| missing_output("group"))
    }

    /// Consume a group without successor.
    pub async fn exit_group(&self, group_id: &UniqueIdentifier) -> Result<TxHash, GroupsError> {
        let input = self.current_group(group_id)?;
        let (network_id, signers) = match input.group() {
            Some(group) => (group.network_id.clone(), owning_keys(&group.participants)),
            None => return Err(GroupsError::NotFound(format!("group {group_id}"))),
        };
        let initiator = self.membership_of(&network_id, &self.identity)?;

        tracing::debug!(group = %group_id, phase = %IssuancePhase::Building, "building group exit");
        let tx = TransactionBuilder::new()
            .input(input)
            .reference(initiator)
            .command(Command::group(GroupCommand::Exit, signers))
            .build();

        Ok(self.submit(tx).await?.tx_id)
    }

    fn current_group(&self, group_id: &UniqueIdentifier) -> Result<StateAndRef, GroupsError> {
        self.query
            .group_by_id(group_id)?
            .ok_or_else(|| GroupsError::NotFound(format!("group {group_id}")))
    }

    fn ensure_name_free(&self, network_id: &NetworkId, name: &str) -> Result<(), GroupsError> {
        if self.query.groups_by_name(network_id, name)?.is_empty() {
            Ok(())
        } else {
            Err(GroupsError::AlreadyExists(format!(
                "group named {name} in network {network_id}"
            )))
        }
    }
}
