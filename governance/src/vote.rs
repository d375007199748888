//! Account and producer ballots on proposals.

use goc_store::{Field, Persisted, Row, Schema};
use goc_types::{AccountName, Timestamp};
use serde::{Deserialize, Serialize};

/// Key of a ballot: proposal first, so one proposal's ballots are contiguous.
pub type BallotKey = (u64, AccountName);

/// Every ballot on proposal `id`.
pub(crate) fn ballots_of(id: u64) -> std::ops::RangeInclusive<BallotKey> {
    (id, AccountName::EMPTY)..=(id, AccountName::new(u64::MAX))
}

/// An account's vote on a proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GocVote {
    pub proposal_id: u64,
    pub owner: AccountName,
    pub vote: bool,
    pub vote_time: Timestamp,
    pub vote_update_time: Timestamp,
    /// Set when the proposal settles.
    pub settle_time: Timestamp,
    /// Weight counted in the proposal tally for this ballot.
    pub weight: f64,
}

impl Row for GocVote {
    type Key = BallotKey;
    const TABLE: &'static str = "votes";

    fn primary_key(&self) -> BallotKey {
        (self.proposal_id, self.owner)
    }
}

impl Persisted for GocVote {
    const SCHEMA: Schema = Schema {
        entity: "goc_vote_info",
        table: "votes",
        version: 1,
        fields: &[
            Field::new("proposal_id", "uint64"),
            Field::new("owner", "name"),
            Field::new("vote", "bool"),
            Field::new("vote_time", "time"),
            Field::new("vote_update_time", "time"),
            Field::new("settle_time", "time"),
            Field::new("weight", "float64"),
        ],
    };
}

/// A producer's ratification vote. Nay scores -1, yea scores 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BpVote {
    pub proposal_id: u64,
    pub owner: AccountName,
    pub vote: bool,
    pub vote_time: Timestamp,
    pub vote_update_time: Timestamp,
    pub settle_time: Timestamp,
}

impl BpVote {
    pub fn score(&self) -> f64 {
        bp_score(self.vote)
    }
}

pub(crate) fn bp_score(yea: bool) -> f64 {
    if yea {
        0.0
    } else {
        -1.0
    }
}

impl Row for BpVote {
    type Key = BallotKey;
    const TABLE: &'static str = "bpvotes";

    fn primary_key(&self) -> BallotKey {
        (self.proposal_id, self.owner)
    }
}

impl Persisted for BpVote {
    const SCHEMA: Schema = Schema {
        entity: "goc_bp_vote_info",
        table: "bpvotes",
        version: 1,
        fields: &[
            Field::new("proposal_id", "uint64"),
            Field::new("owner", "name"),
            Field::new("vote", "bool"),
            Field::new("vote_time", "time"),
            Field::new("vote_update_time", "time"),
            Field::new("settle_time", "time"),
        ],
    };
}
