//! Group lifecycle contract.
//!
//! Structural rules (see [`crate::structure`]) always run first. The
//! per-command rules live on [`GroupRules`]; a specialised deployment can
//! override any of them, or the contract identity its states must carry,
//! while the structural rules stay fixed.

use crate::command::{Command, CommandData, GroupCommand};
use crate::error::{require, EntityKind, ValidationError};
use crate::registry::Contract;
use crate::state::{ContractId, Group, Membership};
use crate::structure::verify_structure;
use crate::transaction::LedgerTransaction;
use crate::validator::verify_initiator;

/// Per-command rules of the group contract.
pub trait GroupRules: Send + Sync {
    /// The contract id group states must carry to be validated by these rules.
    fn contract_id(&self) -> ContractId {
        ContractId::group()
    }

    fn verify_bootstrap(
        &self,
        tx: &LedgerTransaction,
        _command: &Command,
        _output: &Group,
    ) -> Result<(), ValidationError> {
        verify_bootstrap_shape(tx)
    }

    fn verify_create(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        output: &Group,
    ) -> Result<(), ValidationError> {
        require(
            tx.inputs.is_empty(),
            "Group.Create",
            "group creation must not consume any input",
        )?;
        verify_initiator(
            tx,
            &output.network_id,
            &output.participants,
            &command.signers,
            Membership::can_modify_groups,
        )?;
        Ok(())
    }

    fn verify_modify(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Group,
        output: &Group,
    ) -> Result<(), ValidationError> {
        require(
            input.name != output.name || input.participants != output.participants,
            "Group.Modify",
            "group modification must change the name or the participants",
        )?;
        verify_initiator(
            tx,
            &output.network_id,
            &output.participants,
            &command.signers,
            Membership::can_modify_groups,
        )?;
        Ok(())
    }

    fn verify_exit(
        &self,
        tx: &LedgerTransaction,
        command: &Command,
        input: &Group,
    ) -> Result<(), ValidationError> {
        require(
            tx.outputs.is_empty(),
            "Group.Exit",
            "group exit must not produce any output",
        )?;
        verify_initiator(
            tx,
            &input.network_id,
            &input.participants,
            &command.signers,
            Membership::can_modify_groups,
        )?;
        Ok(())
    }
}

/// Bootstrap co-issues exactly one membership and one group from nothing.
pub fn verify_bootstrap_shape(tx: &LedgerTransaction) -> Result<(), ValidationError> {
    const COMMAND: &str = "Group.Bootstrap";
    require(
        tx.inputs.is_empty(),
        COMMAND,
        "bootstrap must not consume any input",
    )?;
    require(
        tx.outputs.len() == 2,
        COMMAND,
        format!("bootstrap must produce exactly two outputs, found {}", tx.outputs.len()),
    )?;
    require(
        tx.outputs_of(EntityKind::Group).count() == 1
            && tx.outputs_of(EntityKind::Membership).count() == 1,
        COMMAND,
        "bootstrap must produce one group and one membership",
    )
}

/// The rules as shipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardGroupRules;

impl GroupRules for StandardGroupRules {}

/// Validates group transitions with rules `R`.
#[derive(Clone, Debug, Default)]
pub struct GroupContract<R = StandardGroupRules> {
    rules: R,
}

impl GroupContract<StandardGroupRules> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: GroupRules> GroupContract<R> {
    pub fn with_rules(rules: R) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }
}

impl<R: GroupRules> Contract for GroupContract<R> {
    fn verify(&self, tx: &LedgerTransaction) -> Result<(), ValidationError> {
        let (command, value) = tx.single_command(EntityKind::Group, CommandData::as_group)?;
        let bootstrap = value == GroupCommand::Bootstrap;
        let evolution =
            verify_structure::<Group>(tx, command, &self.rules.contract_id(), bootstrap)?;

        match (value, evolution.input, evolution.output) {
            (GroupCommand::Bootstrap, _, Some(output)) => {
                self.rules.verify_bootstrap(tx, command, output)
            }
            (GroupCommand::Create, _, Some(output)) => {
                self.rules.verify_create(tx, command, output)
            }
            (GroupCommand::Modify, Some(input), Some(output)) => {
                self.rules.verify_modify(tx, command, input, output)
            }
            (GroupCommand::Exit, Some(input), _) => self.rules.verify_exit(tx, command, input),
            (GroupCommand::Bootstrap | GroupCommand::Create, _, None) => Err(missing(value, "output")),
            (GroupCommand::Modify, None, _) | (GroupCommand::Exit, None, _) => {
                Err(missing(value, "input"))
            }
            (GroupCommand::Modify, Some(_), None) => Err(missing(value, "output")),
        }
    }
}

fn missing(command: GroupCommand, what: &str) -> ValidationError {
    ValidationError::Rejected {
        command: match command {
            GroupCommand::Bootstrap => "Group.Bootstrap",
            GroupCommand::Create => "Group.Create",
            GroupCommand::Modify => "Group.Modify",
            GroupCommand::Exit => "Group.Exit",
        },
        reason: format!("transaction must contain a group {what}"),
    }
}
