//! Membership lifecycle contract.
//!
//! Same shape as the group contract: fixed structural rules, then one
//! overridable rule per [`MembershipCommand`]. On top of the shared
//! structural rules a membership may never change owner, and its owner must
//! always be one of its participants.

use crate::command::{Command, CommandData, MembershipCommand};
use crate::error::{require, EntityKind, ValidationError};
use crate::registry::Contract;
use crate::state::{ContractId, Membership};
use crate::structure::verify_structure;
use crate::transaction::LedgerTransaction;
use crate::validator::verify_initiator;

/// Per-command rules of the membership contract.
pub trait MembershipRules: Send + Sync {
    /// The contract id membership states must carry to be validated by these rules.
    fn contract_id(&self) -> ContractId {
        ContractId::membership()
    }

    fn verify_bootstrap(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.Bootstrap";
        require(tx.inputs.is_empty(), COMMAND, "bootstrap must not consume any input")?;
        require(
            tx.outputs_of(EntityKind::Membership).count() == 1,
            COMMAND,
            "bootstrap must issue exactly one membership",
        )?;
        require(output.is_active(), COMMAND, "bootstrapped membership must be active")?;
        require(
            output.is_operator(),
            COMMAND,
            "bootstrapped membership must hold the operator role",
        )?;
        require(
            command.signers.contains(&output.owner().owning_key),
            COMMAND,
            "membership owner must be a required signer",
        )
    }

    fn verify_request(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.Request";
        require(tx.inputs.is_empty(), COMMAND, "request must not consume any input")?;
        require(output.is_pending(), COMMAND, "requested membership must be pending")?;
        require(
            output.roles.is_empty(),
            COMMAND,
            "requested membership must not hold any role",
        )?;
        require(
            command.signers.contains(&output.owner().owning_key),
            COMMAND,
            "membership owner must be a required signer",
        )
    }

    fn verify_activate(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Membership,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.Activate";
        require(!input.is_active(), COMMAND, "membership is already active")?;
        require(output.is_active(), COMMAND, "output membership must be active")?;
        require(input.roles == output.roles, COMMAND, "roles must not change")?;
        require(
            input.business_identity() == output.business_identity(),
            COMMAND,
            "business identity must not change",
        )?;
        authorize(tx, command, output, Membership::can_activate_membership)
    }

    fn verify_suspend(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Membership,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.Suspend";
        require(!input.is_suspended(), COMMAND, "membership is already suspended")?;
        require(output.is_suspended(), COMMAND, "output membership must be suspended")?;
        require(input.roles == output.roles, COMMAND, "roles must not change")?;
        require(
            input.business_identity() == output.business_identity(),
            COMMAND,
            "business identity must not change",
        )?;
        authorize(tx, command, output, Membership::can_suspend_membership)
    }

    fn verify_modify_roles(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Membership,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.ModifyRoles";
        require(input.status == output.status, COMMAND, "status must not change")?;
        require(
            input.business_identity() == output.business_identity(),
            COMMAND,
            "business identity must not change",
        )?;
        require(input.roles != output.roles, COMMAND, "roles must change")?;
        authorize(tx, command, output, Membership::can_modify_roles)
    }

    fn verify_modify_business_identity(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Membership,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.ModifyBusinessIdentity";
        require(input.status == output.status, COMMAND, "status must not change")?;
        require(input.roles == output.roles, COMMAND, "roles must not change")?;
        require(
            input.business_identity() != output.business_identity(),
            COMMAND,
            "business identity must change",
        )?;
        authorize(tx, command, output, Membership::can_modify_business_identity)
    }

    fn verify_modify_participants(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Membership,
        output: &Membership,
    ) -> Result<(), ValidationError> {
        const COMMAND: &str = "Membership.ModifyParticipants";
        require(input.status == output.status, COMMAND, "status must not change")?;
        require(input.roles == output.roles, COMMAND, "roles must not change")?;
        require(
            input.business_identity() == output.business_identity(),
            COMMAND,
            "business identity must not change",
        )?;
        require(
            input.participants != output.participants,
            COMMAND,
            "participants must change",
        )?;
        authorize(tx, command, output, |_| true)
    }

    fn verify_revoke(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Membership,
    ) -> Result<(), ValidationError> {
        require(
            tx.outputs.is_empty(),
            "Membership.Revoke",
            "revocation must not produce any output",
        )?;
        authorize(tx, command, input, Membership::can_revoke_membership)
    }
}

/// Initiator check scoped to the evolved membership's network and participants.
pub fn authorize(
    tx: &LedgerTransaction,
    command: &Command,
    evolved: &Membership,
    is_authorized: impl Fn(&Membership) -> bool,
) -> Result<(), ValidationError> {
    verify_initiator(
        tx,
        &evolved.network_id,
        &evolved.participants,
        &command.signers,
        is_authorized,
    )?;
    Ok(())
}

/// The rules as shipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardMembershipRules;

impl MembershipRules for StandardMembershipRules {}

/// Validates membership transitions with rules `R`.
#[derive(Clone, Debug, Default)]
pub struct MembershipContract<R = StandardMembershipRules> {
    rules: R,
}

impl MembershipContract<StandardMembershipRules> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: MembershipRules> MembershipContract<R> {
    pub fn with_rules(rules: R) -> Self {
        Self { rules }
    }
}

impl<R: MembershipRules> Contract for MembershipContract<R> {
    fn verify(&self, tx: &LedgerTransaction) -> Result<(), ValidationError> {
        use MembershipCommand::*;

        let (command, value) =
            tx.single_command(EntityKind::Membership, CommandData::as_membership)?;
        let evolution = verify_structure::<Membership>(
            tx,
            command,
            &self.rules.contract_id(),
            value == Bootstrap,
        )?;

        if let Some(output) = evolution.output {
            if !output.participants.contains(output.owner()) {
                return Err(ValidationError::Rejected {
                    command: "Membership",
                    reason: "membership owner must be a participant".into(),
                });
            }
        }
        if let (Some(input), Some(output)) = (evolution.input, evolution.output) {
            if input.owner() != output.owner() {
                return Err(ValidationError::ImmutableFieldChanged {
                    entity: EntityKind::Membership,
                    field: "owner",
                });
            }
        }

        let rules = &self.rules;
        match (value, evolution.input, evolution.output) {
            (Bootstrap, _, Some(out)) => rules.verify_bootstrap(tx, command, out),
            (Request, _, Some(out)) => rules.verify_request(tx, command, out),
            (Activate, Some(inp), Some(out)) => rules.verify_activate(tx, command, inp, out),
            (Suspend, Some(inp), Some(out)) => rules.verify_suspend(tx, command, inp, out),
            (ModifyRoles, Some(inp), Some(out)) => {
                rules.verify_modify_roles(tx, command, inp, out)
            }
            (ModifyBusinessIdentity, Some(inp), Some(out)) => {
                rules.verify_modify_business_identity(tx, command, inp, out)
            }
            (ModifyParticipants, Some(inp), Some(out)) => {
                rules.verify_modify_participants(tx, command, inp, out)
            }
            (Revoke, Some(inp), _) => rules.verify_revoke(tx, command, inp),
            (Bootstrap | Request, _, None) => Err(missing(value, "output")),
            (_, None, _) => Err(missing(value, "input")),
            (_, Some(_), None) => Err(missing(value, "output")),
        }
    }
}

fn missing(command: MembershipCommand, what: &str) -> ValidationError {
    ValidationError::Rejected {
        command: "Membership",
        reason: format!("{command:?} transaction must contain a membership {what}"),
    }
}
