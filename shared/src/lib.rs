pub mod error;
pub mod models;
pub mod validation;
pub mod vote_logic;

pub use error::{Error, ErrorCode};
pub use models::*;
pub use validation::*;
pub use vote_logic::{Tally, VoteError, VoteOp, VoteSets, VoteState};

#[cfg(test)]
mod tests;
