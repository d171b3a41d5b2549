//! Membership identity: the ledger owner plus an optional business identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::party::Party;

/// Application-defined identity attached to a membership (e.g. a LEI or
/// registration number). Opaque to the contracts except for equality.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessIdentity {
    pub kind: String,
    pub attributes: BTreeMap<String, String>,
}

impl BusinessIdentity {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// The owner of a membership and its optional business identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipIdentity {
    pub party: Party,
    #[serde(default)]
    pub business_identity: Option<BusinessIdentity>,
}

impl MembershipIdentity {
    pub fn new(party: Party) -> Self {
        Self {
            party,
            business_identity: None,
        }
    }

    pub fn with_business_identity(mut self, identity: BusinessIdentity) -> Self {
        self.business_identity = Some(identity);
        self
    }
}
