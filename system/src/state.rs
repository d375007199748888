//! Everything the contract persists, and the per-action checkpoint over it.

use goc_governance::GocEngine;
use goc_names::NameAuction;
use goc_resources::{DelegationLedger, RamMarket};
use goc_store::{decode_versioned, encode_versioned, Journaled};
use goc_types::{Asset, GlobalState};
use goc_voting::{Election, ProducerRegistry, VoterRegistry};
use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::SystemError;

/// Version written by [`SystemState::save_state`].
pub const STATE_VERSION: u32 = 1;

/// Singletons restored wholesale on rollback.
#[derive(Debug, Clone)]
struct Snapshot {
    global: GlobalState,
    election: Election,
    ram: RamMarket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemState {
    pub global: GlobalState,
    pub voters: VoterRegistry,
    pub producers: ProducerRegistry,
    pub election: Election,
    pub ledger: DelegationLedger,
    pub ram: RamMarket,
    pub goc: GocEngine,
    pub auction: NameAuction,
    #[serde(skip)]
    snapshot: Option<Box<Snapshot>>,
}

impl SystemState {
    /// State of a freshly initialised chain.
    pub fn genesis(config: &SystemConfig) -> Self {
        let global = config.initial_global();
        let ram = RamMarket::new(
            global.free_ram(),
            Asset::new(config.ram_reserve, config.core_symbol),
        )
        .with_fee_bps(config.ram_fee_bps);
        Self {
            global,
            voters: VoterRegistry::new(),
            producers: ProducerRegistry::new(),
            election: Election::with_max_size(config.schedule_size),
            ledger: DelegationLedger::new(),
            ram,
            goc: GocEngine::new(),
            auction: NameAuction::new(),
            snapshot: None,
        }
    }

    pub fn save_state(&self) -> Result<Vec<u8>, SystemError> {
        Ok(encode_versioned(STATE_VERSION, self)?)
    }

    /// Decode a saved state. Secondary indexes are rebuilt from the rows.
    pub fn load_state(bytes: &[u8]) -> Result<Self, SystemError> {
        let (version, state): (u32, Self) = decode_versioned(STATE_VERSION, bytes)?;
        tracing::info!(
            version,
            voters = state.voters.len(),
            producers = state.producers.len(),
            "state loaded"
        );
        Ok(state)
    }
}

impl Journaled for SystemState {
    fn begin(&mut self) {
        self.snapshot = Some(Box::new(Snapshot {
            global: self.global.clone(),
            election: self.election.clone(),
            ram: self.ram,
        }));
        self.voters.begin();
        self.producers.begin();
        self.ledger.begin();
        self.goc.begin();
        self.auction.begin();
    }

    fn commit(&mut self) {
        self.snapshot = None;
        self.voters.commit();
        self.producers.commit();
        self.ledger.commit();
        self.goc.commit();
        self.auction.commit();
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.global = snapshot.global;
            self.election = snapshot.election;
            self.ram = snapshot.ram;
        }
        self.voters.rollback();
        self.producers.rollback();
        self.ledger.rollback();
        self.goc.rollback();
        self.auction.rollback();
    }
}
