//! Staked governance (GOC) for the system contract.
//!
//! Proposals escrow a fee and pass through two vote windows: staked accounts
//! vote yea or nay weighted by their vote weight, then elected producers may
//! object. A proposal passes when yeas outweigh nays and producer objection
//! stays above the configured threshold.
//!
//! Settlement feeds the voter bucket (forfeited fees and action fees pay
//! proposal rewards); the gn bucket is drained to producers who took part in
//! ratification.

pub mod engine;
pub mod error;
pub mod proposal;
pub mod reward;
pub mod staking;
pub mod vote;

pub use engine::{GocEngine, NewProposal, Settlement};
pub use error::GocError;
pub use proposal::{
    validate_text, ByEndTime, GocProposal, ProposalPhase, StartMode, VoteWindows,
    MAX_PROPOSAL_CONTENT_LEN, MAX_PROPOSAL_NAME_LEN, MAX_PROPOSAL_URL_LEN,
};
pub use reward::GocReward;
pub use staking::StakeSplit;
pub use vote::{BallotKey, BpVote, GocVote};
