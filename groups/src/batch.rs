//! Batch helpers.
//!
//! Each item runs as its own transaction. A failure is recorded against its
//! item and the batch carries on.

use bnms_contracts::StateAndRef;
use bnms_dedup::LockStore;
use bnms_types::{NetworkId, Party};

use crate::coordinator::NetworkCoordinator;
use crate::error::GroupsError;
use crate::service::{QueryService, SubmissionService};

/// Outcome per party, in input order.
pub type BatchOutcome = Vec<(Party, Result<StateAndRef, GroupsError>)>;

impl<Q, T, L> NetworkCoordinator<Q, T, L>
where
    Q: QueryService,
    T: SubmissionService,
    L: LockStore,
{
    pub async fn activate_memberships(
        &self,
        network_id: &NetworkId,
        parties: Vec<Party>,
    ) -> BatchOutcome {
        let mut outcome = Vec::with_capacity(parties.len());
        for party in parties {
            let result = self.activate_membership(network_id, &party).await;
            log_failure("activate", &party, &result);
            outcome.push((party, result));
        }
        outcome
    }

    pub async fn suspend_memberships(
        &self,
        network_id: &NetworkId,
        parties: Vec<Party>,
    ) -> BatchOutcome {
        let mut outcome = Vec::with_capacity(parties.len());
        for party in parties {
            let result = self.suspend_membership(network_id, &party).await;
            log_failure("suspend", &party, &result);
            outcome.push((party, result));
        }
        outcome
    }
}

fn log_failure<T>(operation: &str, party: &Party, result: &Result<T, GroupsError>) {
    if let Err(e) = result {
        tracing::warn!(operation, party = %party, error = %e, "batch item failed");
    }
}
