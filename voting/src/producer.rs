//! Producer records and their registry.

use goc_store::{Descending, Field, Journaled, OrdF64, Persisted, Row, Schema, SecondaryKey, Table};
use goc_types::{AccountName, GlobalState, PublicKey, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::VotingError;

pub const MAX_URL_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub owner: AccountName,
    pub total_votes: f64,
    pub producer_key: PublicKey,
    pub is_active: bool,
    pub url: String,
    pub unpaid_blocks: u32,
    pub last_claim_time: Timestamp,
    pub location: u16,
}

impl ProducerInfo {
    /// Eligible for election: flagged active with a real signing key.
    pub fn active(&self) -> bool {
        self.is_active && !self.producer_key.is_null()
    }

    pub fn deactivate(&mut self) {
        self.producer_key = PublicKey::NULL;
        self.is_active = false;
    }
}

impl Row for ProducerInfo {
    type Key = AccountName;
    const TABLE: &'static str = "producers";

    fn primary_key(&self) -> AccountName {
        self.owner
    }
}

impl Persisted for ProducerInfo {
    const SCHEMA: Schema = Schema {
        entity: "producer_info",
        table: "producers",
        version: 1,
        fields: &[
            Field::new("owner", "name"),
            Field::new("total_votes", "float64"),
            Field::new("producer_key", "public_key"),
            Field::new("is_active", "bool"),
            Field::new("url", "string"),
            Field::new("unpaid_blocks", "uint32"),
            Field::new("last_claim_time", "time_point_sec"),
            Field::new("location", "uint16"),
        ],
    };
}

/// Active producers first, then by descending vote weight.
#[derive(Debug, Clone, Copy)]
pub struct ByTotalVotes;

impl SecondaryKey<ProducerInfo> for ByTotalVotes {
    type Key = (bool, Descending<OrdF64>);

    fn key(row: &ProducerInfo) -> Self::Key {
        (!row.active(), Descending(OrdF64(row.total_votes)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProducerRegistry {
    producers: Table<ProducerInfo, ByTotalVotes>,
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &AccountName) -> Option<&ProducerInfo> {
        self.producers.get(owner)
    }

    pub fn require(&self, owner: &AccountName) -> Result<&ProducerInfo, VotingError> {
        self.producers
            .get(owner)
            .ok_or(VotingError::ProducerNotFound(*owner))
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProducerInfo> + '_ {
        self.producers.iter()
    }

    /// Producers in ranking order: active by descending weight, then inactive.
    pub fn ranked(&self) -> impl Iterator<Item = &ProducerInfo> + '_ {
        self.producers.iter_by_index()
    }

    /// Register or update a producer.
    ///
    /// A null key leaves the producer registered but inactive.
    pub fn register(
        &mut self,
        owner: AccountName,
        key: PublicKey,
        url: &str,
        location: u16,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        if url.len() > MAX_URL_LEN {
            return Err(VotingError::UrlTooLong(url.len()));
        }
        let is_active = !key.is_null();
        if self.producers.contains(&owner) {
            self.producers.modify(&owner, |p| {
                p.producer_key = key;
                p.is_active = is_active;
                p.url = url.to_string();
                p.location = location;
            })?;
        } else {
            self.producers.emplace(ProducerInfo {
                owner,
                total_votes: 0.0,
                producer_key: key,
                is_active,
                url: url.to_string(),
                unpaid_blocks: 0,
                last_claim_time: now,
                location,
            })?;
        }
        tracing::debug!(producer = %owner, active = is_active, "producer registered");
        Ok(())
    }

    /// Deactivate without deleting; accumulated votes stay attributed.
    pub fn unregister(&mut self, owner: AccountName) -> Result<(), VotingError> {
        self.require(&owner)?;
        self.producers.modify(&owner, ProducerInfo::deactivate)?;
        tracing::debug!(producer = %owner, "producer deactivated");
        Ok(())
    }

    /// Count a produced block. Unknown producers are ignored.
    pub fn record_block(&mut self, producer: AccountName, global: &mut GlobalState) -> bool {
        if !self.producers.contains(&producer) {
            return false;
        }
        global.total_unpaid_blocks = global.total_unpaid_blocks.saturating_add(1);
        self.producers
            .modify(&producer, |p| p.unpaid_blocks = p.unpaid_blocks.saturating_add(1))
            .is_ok()
    }

    /// Reset block counter and claim time after a reward payout.
    pub fn record_claim(&mut self, owner: AccountName, now: Timestamp) -> Result<(), VotingError> {
        self.require(&owner)?;
        self.producers.modify(&owner, |p| {
            p.unpaid_blocks = 0;
            p.last_claim_time = now;
        })?;
        Ok(())
    }

    /// Add `delta` to a producer's weight, clamping at zero. The global total
    /// moves by the change actually applied.
    pub(crate) fn add_votes(
        &mut self,
        owner: AccountName,
        delta: f64,
        global: &mut GlobalState,
    ) -> Result<f64, VotingError> {
        let applied = self.producers.modify(&owner, |p| {
            let before = p.total_votes;
            p.total_votes = (before + delta).max(0.0);
            p.total_votes - before
        })?;
        global.total_producer_vote_weight += applied;
        Ok(applied)
    }
}

impl Journaled for ProducerRegistry {
    fn begin(&mut self) {
        self.producers.begin();
    }

    fn commit(&mut self) {
        self.producers.commit();
    }

    fn rollback(&mut self) {
        self.producers.rollback();
    }
}
