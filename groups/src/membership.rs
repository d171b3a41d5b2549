//! Membership request and lifecycle transitions.

use std::collections::BTreeSet;

use bnms_contracts::{
    Command, Membership, MembershipCommand, StateAndRef, TransactionBuilder, TransactionState,
};
use bnms_dedup::{LockKind, LockStore};
use bnms_types::{
    BusinessIdentity, MembershipIdentity, MembershipStatus, NetworkId, Party, Role, TxHash,
    UniqueIdentifier,
};

use crate::coordinator::{membership_payload, missing_output, NetworkCoordinator};
use crate::error::GroupsError;
use crate::service::{IssuancePhase, QueryService, SubmissionService};

/// Parameters for joining an existing network.
#[derive(Clone, Debug)]
pub struct RequestMembership {
    pub network_id: NetworkId,
    /// The operator that will review the request.
    pub operator: Party,
    pub business_identity: Option<BusinessIdentity>,
}

impl<Q, T, L> NetworkCoordinator<Q, T, L>
where
    Q: QueryService,
    T: SubmissionService,
    L: LockStore,
{
    /// Ask to join a network. The new membership is pending until an
    /// authorised member activates it.
    pub async fn request_membership(
        &self,
        request: RequestMembership,
    ) -> Result<StateAndRef, GroupsError> {
        let network_id = &request.network_id;

        tracing::debug!(network = %network_id, phase = %IssuancePhase::CheckingConflicts, "requesting membership");
        if !self.query.network_exists(network_id)? {
            return Err(GroupsError::NotFound(format!("network {network_id}")));
        }
        if self.query.membership(network_id, &self.identity)?.is_some() {
            return Err(GroupsError::AlreadyExists(format!(
                "membership of {} in network {network_id}",
                self.identity
            )));
        }
        self.membership_of(network_id, &request.operator)?;

        let _lock = self.lock(
            LockKind::PendingMembership,
            &membership_payload(network_id, &self.identity),
        )?;

        tracing::debug!(network = %network_id, phase = %IssuancePhase::Building, "building membership request");
        let now = self.now();
        let us = self.identity.clone();
        let mut identity = MembershipIdentity::new(us.clone());
        if let Some(business_identity) = request.business_identity {
            identity = identity.with_business_identity(business_identity);
        }
        let membership = Membership {
            identity,
            network_id: network_id.clone(),
            status: MembershipStatus::Pending,
            roles: BTreeSet::new(),
            linear_id: UniqueIdentifier::random(),
            issuer: us.clone(),
            issued: now,
            modified: now,
            participants: BTreeSet::from([us.clone(), request.operator]),
        };
        let tx = TransactionBuilder::new()
            .output(TransactionState::membership(membership))
            .command(Command::membership(
                MembershipCommand::Request,
                [us.owning_key],
            ))
            .build();

        let record = self.submit(tx).await?;
        record
            .membership()
            .cloned()
            .ok_or_else(|| missing_output("membership"))
    }

    pub async fn activate_membership(
        &self,
        network_id: &NetworkId,
        party: &Party,
    ) -> Result<StateAndRef, GroupsError> {
        self.evolve_membership(network_id, party, MembershipCommand::Activate, |m| {
            m.status = MembershipStatus::Active;
        })
        .await
    }

    pub async fn suspend_membership(
        &self,
        network_id: &NetworkId,
        party: &Party,
    ) -> Result<StateAndRef, GroupsError> {
        self.evolve_membership(network_id, party, MembershipCommand::Suspend, |m| {
            m.status = MembershipStatus::Suspended;
        })
        .await
    }

    pub async fn modify_roles(
        &self,
        network_id: &NetworkId,
        party: &Party,
        roles: BTreeSet<Role>,
    ) -> Result<StateAndRef, GroupsError> {
        self.evolve_membership(network_id, party, MembershipCommand::ModifyRoles, |m| {
            m.roles = roles;
        })
        .await
    }

    pub async fn modify_business_identity(
        &self,
        network_id: &NetworkId,
        party: &Party,
        business_identity: Option<BusinessIdentity>,
    ) -> Result<StateAndRef, GroupsError> {
        self.evolve_membership(
            network_id,
            party,
            MembershipCommand::ModifyBusinessIdentity,
            |m| m.identity.business_identity = business_identity,
        )
        .await
    }

    /// Replace the parties that observe `party`'s membership.
    pub async fn modify_participants(
        &self,
        network_id: &NetworkId,
        party: &Party,
        participants: BTreeSet<Party>,
    ) -> Result<StateAndRef, GroupsError> {
        self.evolve_membership(
            network_id,
            party,
            MembershipCommand::ModifyParticipants,
            |m| m.participants = participants,
        )
        .await
    }

    /// Consume `party`'s membership without successor.
    pub async fn revoke_membership(
        &self,
        network_id: &NetworkId,
        party: &Party,
    ) -> Result<TxHash, GroupsError> {
        let input = self.membership_of(network_id, party)?;
        let mut builder = TransactionBuilder::new()
            .input(input)
            .command(Command::membership(
                MembershipCommand::Revoke,
                self.transition_signers(party),
            ));
        if party != &self.identity {
            builder = builder.reference(self.membership_of(network_id, &self.identity)?);
        }

        tracing::debug!(network = %network_id, party = %party, phase = %IssuancePhase::Building, "revoking membership");
        Ok(self.submit(builder.build()).await?.tx_id)
    }

    /// Evolve `party`'s membership with `change` under `command`.
    ///
    /// When acting on another party's membership, this party's own
    /// membership is attached as the reference that authorises the change.
    async fn evolve_membership(
        &self,
        network_id: &NetworkId,
        party: &Party,
        command: MembershipCommand,
        change: impl FnOnce(&mut Membership),
    ) -> Result<StateAndRef, GroupsError> {
        let input = self.membership_of(network_id, party)?;
        let mut output = input
            .membership()
            .cloned()
            .ok_or_else(|| GroupsError::NotFound(format!("membership of {party}")))?;
        let previous = output.modified;
        change(&mut output);
        output.modified = self.now().max(previous);

        let mut builder = TransactionBuilder::new()
            .input(input)
            .output(TransactionState::membership(output))
            .command(Command::membership(command, self.transition_signers(party)));
        if party != &self.identity {
            builder = builder.reference(self.membership_of(network_id, &self.identity)?);
        }

        tracing::debug!(network = %network_id, party = %party, command = ?command, phase = %IssuancePhase::Building, "evolving membership");
        let record = self.submit(builder.build()).await?;
        record
            .membership()
            .cloned()
            .ok_or_else(|| missing_output("membership"))
    }

    /// The initiator and the membership owner both sign a transition.
    fn transition_signers(&self, owner: &Party) -> BTreeSet<bnms_types::PublicKey> {
        BTreeSet::from([
            self.identity.owning_key.clone(),
            owner.owning_key.clone(),
        ])
    }
}
