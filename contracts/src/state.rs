//! Ledger states tracked by the contracts.

use bnms_types::{
    BusinessIdentity, MembershipIdentity, MembershipStatus, NetworkId, Party, Permission, Role,
    Timestamp, TxHash, UniqueIdentifier,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::EntityKind;

/// Names the contract implementation that governs a state.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractId(String);

impl ContractId {
    pub const GROUP: &'static str = "bnms.contracts.GroupContract";
    pub const MEMBERSHIP: &'static str = "bnms.contracts.MembershipContract";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn group() -> Self {
        Self::new(Self::GROUP)
    }

    pub fn membership() -> Self {
        Self::new(Self::MEMBERSHIP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A collection of business network members with a caller-assignable id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub network_id: NetworkId,
    #[serde(default)]
    pub name: Option<String>,
    pub linear_id: UniqueIdentifier,
    pub issuer: Party,
    pub issued: Timestamp,
    pub modified: Timestamp,
    pub participants: BTreeSet<Party>,
}

/// A party's participation record in a business network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub identity: MembershipIdentity,
    pub network_id: NetworkId,
    pub status: MembershipStatus,
    pub roles: BTreeSet<Role>,
    pub linear_id: UniqueIdentifier,
    pub issuer: Party,
    pub issued: Timestamp,
    pub modified: Timestamp,
    pub participants: BTreeSet<Party>,
}

impl Membership {
    pub fn owner(&self) -> &Party {
        &self.identity.party
    }

    pub fn business_identity(&self) -> Option<&BusinessIdentity> {
        self.identity.business_identity.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    pub fn is_suspended(&self) -> bool {
        self.status == MembershipStatus::Suspended
    }

    /// Whether any held role grants `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.roles.iter().any(|r| r.grants(permission))
    }

    pub fn is_operator(&self) -> bool {
        self.roles.iter().any(|r| r.name == Role::OPERATOR)
    }

    pub fn can_activate_membership(&self) -> bool {
        self.has_permission(Permission::CanActivateMembership)
    }

    pub fn can_suspend_membership(&self) -> bool {
        self.has_permission(Permission::CanSuspendMembership)
    }

    pub fn can_revoke_membership(&self) -> bool {
        self.has_permission(Permission::CanRevokeMembership)
    }

    pub fn can_modify_roles(&self) -> bool {
        self.has_permission(Permission::CanModifyRoles)
    }

    pub fn can_modify_business_identity(&self) -> bool {
        self.has_permission(Permission::CanModifyBusinessIdentity)
    }

    pub fn can_modify_groups(&self) -> bool {
        self.has_permission(Permission::CanModifyGroups)
    }
}

/// The closed set of state kinds this ledger carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractState {
    Group(Group),
    Membership(Membership),
}

impl ContractState {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Group(_) => EntityKind::Group,
            Self::Membership(_) => EntityKind::Membership,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_membership(&self) -> Option<&Membership> {
        match self {
            Self::Membership(m) => Some(m),
            _ => None,
        }
    }

    pub fn participants(&self) -> &BTreeSet<Party> {
        match self {
            Self::Group(g) => &g.participants,
            Self::Membership(m) => &m.participants,
        }
    }
}

/// A state together with the contract that must approve its consumption and creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    pub data: ContractState,
    pub contract: ContractId,
}

impl TransactionState {
    /// Wrap a group under the standard group contract.
    pub fn group(group: Group) -> Self {
        Self {
            data: ContractState::Group(group),
            contract: ContractId::group(),
        }
    }

    /// Wrap a membership under the standard membership contract.
    pub fn membership(membership: Membership) -> Self {
        Self {
            data: ContractState::Membership(membership),
            contract: ContractId::membership(),
        }
    }

    pub fn with_contract(mut self, contract: ContractId) -> Self {
        self.contract = contract;
        self
    }
}

/// Points at output `index` of transaction `tx_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: TxHash,
    pub index: u32,
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}

/// A resolved ledger state and where it was recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: TransactionState,
    pub reference: StateRef,
}

impl StateAndRef {
    pub fn group(&self) -> Option<&Group> {
        self.state.data.as_group()
    }

    pub fn membership(&self) -> Option<&Membership> {
        self.state.data.as_membership()
    }
}
