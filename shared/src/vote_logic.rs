use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("Already liked")]
    AlreadyLiked,
    #[error("Already disliked")]
    AlreadyDisliked,
    #[error("Not liked")]
    NotLiked,
    #[error("Not disliked")]
    NotDisliked,
}

/// The four transitions a voter can request on a votable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOp {
    Like,
    Unlike,
    Dislike,
    RevertDislike,
}

/// Where a single voter currently stands on a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Neutral,
    Liked,
    Disliked,
}

/// Derived like/dislike counts, always computed from set sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub like_count: usize,
    pub dislike_count: usize,
}

/// Per-voter like/dislike membership for one votable entity.
///
/// Counts are never stored; they are always `liked_by.len()` /
/// `disliked_by.len()`, so a voter toggling can never drive a count
/// negative and one voter can never consume another voter's vote.
/// Sorted sets give the storage layer a canonical representation to
/// compare against when swapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSets<V: Clone + Ord> {
    liked_by: BTreeSet<V>,
    disliked_by: BTreeSet<V>,
}

impl<V: Clone + Ord> VoteSets<V> {
    pub fn new() -> Self {
        Self {
            liked_by: BTreeSet::new(),
            disliked_by: BTreeSet::new(),
        }
    }

    pub fn state_of(&self, voter: &V) -> VoteState {
        if self.liked_by.contains(voter) {
            VoteState::Liked
        } else if self.disliked_by.contains(voter) {
            VoteState::Disliked
        } else {
            VoteState::Neutral
        }
    }

    pub fn tally(&self) -> Tally {
        Tally {
            like_count: self.liked_by.len(),
            dislike_count: self.disliked_by.len(),
        }
    }

    pub fn liked_by(&self) -> &BTreeSet<V> {
        &self.liked_by
    }

    pub fn disliked_by(&self) -> &BTreeSet<V> {
        &self.disliked_by
    }

    pub fn from_parts(liked_by: BTreeSet<V>, disliked_by: BTreeSet<V>) -> Self {
        Self { liked_by, disliked_by }
    }

    /// Applies one transition for one voter and returns the new tally.
    ///
    /// A rejected transition returns the error without touching either
    /// set. Mutual exclusion holds afterwards in every accepted case:
    /// the only inserts happen together with a remove from the other set
    /// or from a state where the voter is in neither set.
    pub fn apply(&mut self, op: VoteOp, voter: &V) -> Result<Tally, VoteError> {
        match (op, self.state_of(voter)) {
            (VoteOp::Like, VoteState::Liked) => return Err(VoteError::AlreadyLiked),
            (VoteOp::Like, VoteState::Neutral) => {
                self.liked_by.insert(voter.clone());
            }
            (VoteOp::Like, VoteState::Disliked) => {
                self.disliked_by.remove(voter);
                self.liked_by.insert(voter.clone());
            }
            (VoteOp::Unlike, VoteState::Liked) => {
                self.liked_by.remove(voter);
            }
            (VoteOp::Unlike, _) => return Err(VoteError::NotLiked),
            (VoteOp::Dislike, VoteState::Disliked) => return Err(VoteError::AlreadyDisliked),
            (VoteOp::Dislike, VoteState::Neutral) => {
                self.disliked_by.insert(voter.clone());
            }
            (VoteOp::Dislike, VoteState::Liked) => {
                self.liked_by.remove(voter);
                self.disliked_by.insert(voter.clone());
            }
            (VoteOp::RevertDislike, VoteState::Disliked) => {
                self.disliked_by.remove(voter);
            }
            (VoteOp::RevertDislike, _) => return Err(VoteError::NotDisliked),
        }
        Ok(self.tally())
    }
}
