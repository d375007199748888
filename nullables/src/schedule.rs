//! Nullable block-production sink: records what it was asked to publish.

use std::sync::Mutex;

use goc_host::{HostError, ProducerKey, ScheduleSink};
use goc_types::ChainParameters;

use crate::lock;

#[derive(Debug, Default)]
pub struct NullScheduleSink {
    schedules: Mutex<Vec<Vec<ProducerKey>>>,
    params: Mutex<Option<ChainParameters>>,
}

impl NullScheduleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every proposed schedule, oldest first.
    pub fn proposed(&self) -> Vec<Vec<ProducerKey>> {
        lock(&self.schedules).clone()
    }

    pub fn last_schedule(&self) -> Option<Vec<ProducerKey>> {
        lock(&self.schedules).last().cloned()
    }

    pub fn chain_parameters(&self) -> Option<ChainParameters> {
        lock(&self.params).clone()
    }
}

impl ScheduleSink for NullScheduleSink {
    fn propose_schedule(&self, producers: &[ProducerKey]) -> Result<(), HostError> {
        lock(&self.schedules).push(producers.to_vec());
        Ok(())
    }

    fn set_chain_parameters(&self, params: &ChainParameters) -> Result<(), HostError> {
        *lock(&self.params) = Some(params.clone());
        Ok(())
    }
}
