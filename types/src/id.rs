//! Linear identifiers for evolving ledger states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::BnmsError;

/// Identifies a linear state across all of its versions.
///
/// The `id` is what uniqueness is enforced on; `external_id` is a free-form
/// label a caller may attach.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniqueIdentifier {
    pub external_id: Option<String>,
    pub id: Uuid,
}

impl UniqueIdentifier {
    /// A fresh random identifier.
    pub fn random() -> Self {
        Self {
            external_id: None,
            id: Uuid::new_v4(),
        }
    }

    /// Wrap a caller-chosen uuid.
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            external_id: None,
            id,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.external_id {
            Some(ext) => write!(f, "{}_{}", ext, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for UniqueIdentifier {
    type Err = BnmsError;

    /// Parses `"<uuid>"` or `"<external>_<uuid>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (external_id, raw) = match s.rsplit_once('_') {
            Some((ext, raw)) => (Some(ext.to_string()), raw),
            None => (None, s),
        };
        let id = Uuid::parse_str(raw).map_err(|e| BnmsError::InvalidIdentifier(e.to_string()))?;
        Ok(Self { external_id, id })
    }
}
