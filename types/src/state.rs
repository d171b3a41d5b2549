//! Membership status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipStatus {
    /// Requested by the member; awaiting operator activation.
    Pending,
    /// Full participant of the business network.
    Active,
    /// Temporarily barred from acting in the network.
    Suspended,
}

impl MembershipStatus {
    /// Whether a membership in this status may initiate transitions.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
        };
        f.write_str(s)
    }
}
