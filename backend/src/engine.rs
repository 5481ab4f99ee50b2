use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::{RecordStore, VoteTarget};
use shared::vote_logic::{Tally, VoteOp};

/// Lost-update guard: how often a vote retries after losing a
/// compare-and-swap race on the same entity.
const MAX_SWAP_ATTEMPTS: usize = 5;

pub struct VoteEngine;

impl VoteEngine {
    /// Applies one vote transition for one voter against one entity.
    ///
    /// Loads the entity's vote sets, runs the state machine, and
    /// persists the result only if the sets are still what was read.
    /// An invalid transition fails without persisting anything; only a
    /// lost swap is retried.
    pub async fn apply(
        store: &dyn RecordStore,
        target: VoteTarget,
        voter: Uuid,
        op: VoteOp,
    ) -> Result<Tally, ApiError> {
        for attempt in 0..MAX_SWAP_ATTEMPTS {
            let current = store
                .fetch_vote_sets(target)
                .await?
                .ok_or(ApiError::NotFound)?;

            let mut next = current.clone();
            let tally = next.apply(op, &voter)?;

            if store.swap_vote_sets(target, &current, &next).await? {
                return Ok(tally);
            }
            warn!(?target, attempt, "vote swap lost a race, retrying");
        }

        Err(ApiError::Internal("Vote conflict retries exhausted".into()))
    }
}
