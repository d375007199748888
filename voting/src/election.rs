//! Producer election.
//!
//! The schedule is the top [`MAX_SCHEDULE_SIZE`] active producers with
//! positive weight, published in name order. Re-electing with unchanged
//! rankings yields nothing to publish, so running it on every block is safe.

use goc_host::ProducerKey;
use goc_types::{AccountName, BlockTimestamp, GlobalState};
use serde::{Deserialize, Serialize};

use crate::producer::ProducerRegistry;

pub const MAX_SCHEDULE_SIZE: usize = 21;

fn default_max_size() -> usize {
    MAX_SCHEDULE_SIZE
}

/// The last published schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Election {
    schedule: Vec<ProducerKey>,
    version: u32,
    #[serde(default = "default_max_size")]
    max_size: usize,
}

impl Default for Election {
    fn default() -> Self {
        Self {
            schedule: Vec::new(),
            version: 0,
            max_size: MAX_SCHEDULE_SIZE,
        }
    }
}

impl Election {
    pub fn new() -> Self {
        Self::default()
    }

    /// An election publishing at most `max_size` producers, capped at
    /// [`MAX_SCHEDULE_SIZE`].
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size: max_size.clamp(1, MAX_SCHEDULE_SIZE),
            ..Self::default()
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Highest-ranked electable producers, best first.
    pub fn top_producers(producers: &ProducerRegistry, limit: usize) -> Vec<ProducerKey> {
        producers
            .ranked()
            .take_while(|p| p.active() && p.total_votes > 0.0)
            .take(limit)
            .map(|p| ProducerKey {
                producer_name: p.owner,
                block_signing_key: p.producer_key,
            })
            .collect()
    }

    pub fn schedule(&self) -> &[ProducerKey] {
        &self.schedule
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_elected(&self, owner: &AccountName) -> bool {
        self.schedule.iter().any(|p| p.producer_name == *owner)
    }

    /// Re-run the election at `block_time`.
    ///
    /// Returns the schedule to publish when the elected set changed. A
    /// smaller set than the one last published is never proposed.
    pub fn elect(
        &mut self,
        producers: &ProducerRegistry,
        global: &mut GlobalState,
        block_time: BlockTimestamp,
    ) -> Option<Vec<ProducerKey>> {
        global.last_producer_schedule_update = block_time;

        let mut top = Self::top_producers(producers, self.max_size);
        if top.is_empty() || top.len() < usize::from(global.last_producer_schedule_size) {
            return None;
        }
        top.sort_by_key(|p| p.producer_name);
        if top == self.schedule {
            return None;
        }

        self.schedule = top.clone();
        self.version = self.version.wrapping_add(1);
        global.last_producer_schedule_size = top.len() as u16;
        tracing::info!(
            version = self.version,
            size = top.len(),
            %block_time,
            "new producer schedule elected"
        );
        Some(top)
    }
}
