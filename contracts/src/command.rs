//! Commands: the declared intent of a transaction and who must sign for it.

use bnms_types::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Group lifecycle commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupCommand {
    /// Co-issued with the operator's membership when a network is created.
    Bootstrap,
    Create,
    Modify,
    Exit,
}

/// Membership lifecycle commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipCommand {
    Bootstrap,
    Request,
    Activate,
    Suspend,
    ModifyRoles,
    ModifyBusinessIdentity,
    ModifyParticipants,
    Revoke,
}

/// Every command value a transaction may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandData {
    Group(GroupCommand),
    Membership(MembershipCommand),
}

impl CommandData {
    pub fn as_group(&self) -> Option<GroupCommand> {
        match self {
            Self::Group(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_membership(&self) -> Option<MembershipCommand> {
        match self {
            Self::Membership(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for CommandData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(c) => write!(f, "Group.{c:?}"),
            Self::Membership(c) => write!(f, "Membership.{c:?}"),
        }
    }
}

/// A command and the keys it declares as required signers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub value: CommandData,
    pub signers: BTreeSet<PublicKey>,
}

impl Command {
    pub fn new(value: CommandData, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            value,
            signers: signers.into_iter().collect(),
        }
    }

    pub fn group(command: GroupCommand, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self::new(CommandData::Group(command), signers)
    }

    pub fn membership(
        command: MembershipCommand,
        signers: impl IntoIterator<Item = PublicKey>,
    ) -> Self {
        Self::new(CommandData::Membership(command), signers)
    }
}
