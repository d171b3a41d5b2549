//! Roles and the administrative permissions they grant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An administrative permission a role may grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    CanActivateMembership,
    CanSuspendMembership,
    CanRevokeMembership,
    CanModifyRoles,
    CanModifyBusinessIdentity,
    CanModifyGroups,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::CanActivateMembership,
        Permission::CanSuspendMembership,
        Permission::CanRevokeMembership,
        Permission::CanModifyRoles,
        Permission::CanModifyBusinessIdentity,
        Permission::CanModifyGroups,
    ];
}

/// A named bundle of permissions held by a membership.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub permissions: BTreeSet<Permission>,
}

impl Role {
    /// Name of the built-in network operator role.
    pub const OPERATOR: &'static str = "BNO";
    /// Name of the built-in plain member role.
    pub const MEMBER: &'static str = "Member";

    pub fn new(name: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Business network operator: holds every administrative permission.
    pub fn operator() -> Self {
        Self::new(Self::OPERATOR, Permission::ALL)
    }

    /// Plain member with no administrative permissions.
    pub fn member() -> Self {
        Self::new(Self::MEMBER, [])
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
