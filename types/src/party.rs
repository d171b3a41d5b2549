//! Ledger party: a named identity backed by a signing key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::keys::PublicKey;
use crate::BnmsError;

/// A well-known ledger identity.
///
/// Two parties are equal only when both the name and the owning key match.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Party {
    /// Legal name, e.g. `"O=PartyA, L=London, C=GB"`.
    pub name: String,
    /// Key the party signs transactions with.
    pub owning_key: PublicKey,
}

impl Party {
    /// Create a party.
    ///
    /// Returns an error if the name is blank.
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Result<Self, BnmsError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BnmsError::InvalidParty("party name must not be blank".into()));
        }
        Ok(Self { name, owning_key })
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
