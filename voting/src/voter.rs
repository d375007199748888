use goc_store::{Field, Persisted, Row, Schema};
use goc_types::AccountName;
use serde::{Deserialize, Serialize};

use crate::delta::Ballot;

pub const MAX_PRODUCERS_PER_VOTE: usize = 30;

/// Per-account voting state.
///
/// A voter either names producers directly or delegates to a proxy, never
/// both. Records are never removed; they persist at zero values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterInfo {
    pub owner: AccountName,
    /// `AccountName::EMPTY` when voting directly.
    pub proxy: AccountName,
    /// Sorted, distinct.
    pub producers: Vec<AccountName>,
    pub staked: i64,
    /// Weight currently applied to the producers or proxy voted for.
    pub last_vote_weight: f64,
    /// Total weight delegated to this account while it is a proxy.
    pub proxied_vote_weight: f64,
    pub is_proxy: bool,
    /// Stake self-delegated through governance staking.
    pub goc_staked: i64,
}

impl VoterInfo {
    pub fn new(owner: AccountName) -> Self {
        Self {
            owner,
            proxy: AccountName::EMPTY,
            producers: Vec::new(),
            staked: 0,
            last_vote_weight: 0.0,
            proxied_vote_weight: 0.0,
            is_proxy: false,
            goc_staked: 0,
        }
    }

    pub fn has_proxy(&self) -> bool {
        !self.proxy.is_empty()
    }

    /// True if the voter currently casts producer votes, directly or by proxy.
    pub fn is_voting(&self) -> bool {
        self.has_proxy() || !self.producers.is_empty()
    }

    pub fn ballot(&self) -> Ballot {
        if self.has_proxy() {
            Ballot::Proxy(self.proxy)
        } else if self.producers.is_empty() {
            Ballot::None
        } else {
            Ballot::Producers(self.producers.clone())
        }
    }
}

impl Row for VoterInfo {
    type Key = AccountName;
    const TABLE: &'static str = "voters";

    fn primary_key(&self) -> AccountName {
        self.owner
    }
}

impl Persisted for VoterInfo {
    const SCHEMA: Schema = Schema {
        entity: "voter_info",
        table: "voters",
        version: 1,
        fields: &[
            Field::new("owner", "name"),
            Field::new("proxy", "name"),
            Field::new("producers", "name[]"),
            Field::new("staked", "int64"),
            Field::new("last_vote_weight", "float64"),
            Field::new("proxied_vote_weight", "float64"),
            Field::new("is_proxy", "bool"),
            Field::new("goc_staked", "int64"),
        ],
    };
}
