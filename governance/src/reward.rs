use goc_store::{Field, Persisted, Row, Schema};
use goc_types::{AccountName, Asset, Timestamp};
use serde::{Deserialize, Serialize};

/// A reward credited to the owner of a passed proposal, held until claimed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GocReward {
    pub owner: AccountName,
    pub proposal_id: u64,
    pub reward_time: Timestamp,
    pub rewards: Asset,
}

impl Row for GocReward {
    type Key = (AccountName, u64);
    const TABLE: &'static str = "gocreward";

    fn primary_key(&self) -> Self::Key {
        (self.owner, self.proposal_id)
    }
}

impl Persisted for GocReward {
    const SCHEMA: Schema = Schema {
        entity: "goc_reward_info",
        table: "gocreward",
        version: 1,
        fields: &[
            Field::new("owner", "name"),
            Field::new("proposal_id", "uint64"),
            Field::new("reward_time", "time"),
            Field::new("rewards", "asset"),
        ],
    };
}
