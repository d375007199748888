//! The global state singleton and the parameter sets stored in it.

use crate::time::{BlockTimestamp, Timestamp, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Default RAM capacity: 64 GiB.
pub const DEFAULT_MAX_RAM_SIZE: u64 = 64 * 1024 * 1024 * 1024;

/// Block-production limits forwarded to the host by `setparams`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParameters {
    pub max_block_net_usage: u64,
    /// Basis points of the block limit targeted under congestion.
    pub target_block_net_usage_pct: u32,
    pub max_transaction_net_usage: u32,
    pub base_per_transaction_net_usage: u32,
    pub net_usage_leeway: u32,
    pub max_block_cpu_usage: u32,
    pub target_block_cpu_usage_pct: u32,
    pub max_transaction_cpu_usage: u32,
    pub min_transaction_cpu_usage: u32,
    pub max_transaction_lifetime: u32,
    pub deferred_trx_expiration_window: u32,
    pub max_transaction_delay: u32,
    pub max_inline_action_size: u32,
    pub max_inline_action_depth: u16,
    pub max_authority_depth: u16,
}

impl Default for ChainParameters {
    fn default() -> Self {
        Self {
            max_block_net_usage: 1024 * 1024,
            target_block_net_usage_pct: 1000,
            max_transaction_net_usage: 512 * 1024,
            base_per_transaction_net_usage: 12,
            net_usage_leeway: 500,
            max_block_cpu_usage: 200_000,
            target_block_cpu_usage_pct: 1000,
            max_transaction_cpu_usage: 150_000,
            min_transaction_cpu_usage: 100,
            max_transaction_lifetime: 3600,
            deferred_trx_expiration_window: 600,
            max_transaction_delay: 45 * 24 * 3600,
            max_inline_action_size: 4096,
            max_inline_action_depth: 4,
            max_authority_depth: 6,
        }
    }
}

impl ChainParameters {
    /// Check internal consistency; returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_block_net_usage_pct > 10_000 || self.target_block_cpu_usage_pct > 10_000 {
            return Err("target usage percentages must not exceed 10000 basis points".into());
        }
        if u64::from(self.max_transaction_net_usage) >= self.max_block_net_usage {
            return Err("max transaction net usage must be less than max block net usage".into());
        }
        if self.max_transaction_cpu_usage >= self.max_block_cpu_usage {
            return Err("max transaction cpu usage must be less than max block cpu usage".into());
        }
        if self.min_transaction_cpu_usage > self.max_transaction_cpu_usage {
            return Err("min transaction cpu usage cannot exceed max transaction cpu usage".into());
        }
        Ok(())
    }
}

/// Governance limits adjustable through `setgocparams`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GocParams {
    pub proposal_fee_limit: i64,
    pub stake_limit: i64,
    pub action_fee: i64,
    pub max_proposal_reward: i64,
    pub governance_vote_period: u64,
    pub bp_vote_period: u64,
    pub vote_start_delay: u64,
    /// Proposals pass only while the producer-nay score stays at or above this.
    pub bp_nay_threshold: f64,
    pub gn_drain_interval: u64,
    pub voter_inflow_bps: u32,
    pub gn_inflow_bps: u32,
}

impl Default for GocParams {
    fn default() -> Self {
        Self {
            proposal_fee_limit: 10_000_000,
            stake_limit: 1_000_000_000,
            action_fee: 10_000,
            max_proposal_reward: 1_000_000,
            governance_vote_period: 7 * SECONDS_PER_DAY,
            bp_vote_period: 7 * SECONDS_PER_DAY,
            vote_start_delay: 3 * SECONDS_PER_DAY,
            bp_nay_threshold: -7.0,
            gn_drain_interval: 7 * SECONDS_PER_DAY,
            voter_inflow_bps: 0,
            gn_inflow_bps: 0,
        }
    }
}

impl GocParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.proposal_fee_limit <= 0 || self.stake_limit < 0 || self.action_fee < 0 {
            return Err("fee and stake limits must be non-negative (fee limit positive)".into());
        }
        if self.max_proposal_reward < 0 {
            return Err("max proposal reward must be non-negative".into());
        }
        if self.governance_vote_period == 0 || self.bp_vote_period == 0 {
            return Err("vote periods must be non-zero".into());
        }
        if !self.bp_nay_threshold.is_finite() || self.bp_nay_threshold > 0.0 {
            return Err("producer nay threshold must be a finite non-positive number".into());
        }
        if self.voter_inflow_bps + self.gn_inflow_bps > 10_000 {
            return Err("bucket inflows cannot exceed 10000 basis points of savings".into());
        }
        Ok(())
    }
}

/// Network-wide singleton mutated by almost every action.
///
/// Invariant: `total_ram_bytes_reserved <= max_ram_size`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    pub chain: ChainParameters,

    pub max_ram_size: u64,
    pub total_ram_bytes_reserved: u64,
    pub total_ram_stake: i64,

    pub last_producer_schedule_update: BlockTimestamp,
    pub last_pervote_bucket_fill: Timestamp,
    pub pervote_bucket: i64,
    pub perblock_bucket: i64,
    /// All blocks which have been produced but not paid.
    pub total_unpaid_blocks: u32,
    pub total_activated_stake: i64,
    pub thresh_activated_stake_time: Timestamp,
    pub last_producer_schedule_size: u16,
    /// Sum of all producer vote weights.
    pub total_producer_vote_weight: f64,
    pub last_name_close: BlockTimestamp,
    pub min_activated_stake: i64,

    pub goc_proposal_fee_limit: i64,
    pub goc_stake_limit: i64,
    pub goc_action_fee: i64,
    pub goc_max_proposal_reward: i64,
    pub goc_governance_vote_period: u64,
    pub goc_bp_vote_period: u64,
    pub goc_vote_start_time: u64,
    pub goc_bp_nay_threshold: f64,
    pub goc_gn_drain_interval: u64,
    pub goc_voter_inflow_bps: u32,
    pub goc_gn_inflow_bps: u32,

    pub goc_voter_bucket: i64,
    pub goc_gn_bucket: i64,
    pub last_gn_bucket_empty: Timestamp,
}

impl Default for GlobalState {
    fn default() -> Self {
        let mut state = Self {
            chain: ChainParameters::default(),
            max_ram_size: DEFAULT_MAX_RAM_SIZE,
            total_ram_bytes_reserved: 0,
            total_ram_stake: 0,
            last_producer_schedule_update: BlockTimestamp::default(),
            last_pervote_bucket_fill: Timestamp::EPOCH,
            pervote_bucket: 0,
            perblock_bucket: 0,
            total_unpaid_blocks: 0,
            total_activated_stake: 0,
            thresh_activated_stake_time: Timestamp::EPOCH,
            last_producer_schedule_size: 0,
            total_producer_vote_weight: 0.0,
            last_name_close: BlockTimestamp::default(),
            min_activated_stake: 1_500_000_000_000,
            goc_proposal_fee_limit: 0,
            goc_stake_limit: 0,
            goc_action_fee: 0,
            goc_max_proposal_reward: 0,
            goc_governance_vote_period: 0,
            goc_bp_vote_period: 0,
            goc_vote_start_time: 0,
            goc_bp_nay_threshold: 0.0,
            goc_gn_drain_interval: 0,
            goc_voter_inflow_bps: 0,
            goc_gn_inflow_bps: 0,
            goc_voter_bucket: 0,
            goc_gn_bucket: 0,
            last_gn_bucket_empty: Timestamp::EPOCH,
        };
        state.apply_goc_params(&GocParams::default());
        state
    }
}

impl GlobalState {
    pub fn free_ram(&self) -> u64 {
        self.max_ram_size.saturating_sub(self.total_ram_bytes_reserved)
    }

    /// True once enough stake has voted for rewards and unstaking to unlock.
    pub fn is_activated(&self) -> bool {
        self.total_activated_stake >= self.min_activated_stake
    }

    pub fn goc_params(&self) -> GocParams {
        GocParams {
            proposal_fee_limit: self.goc_proposal_fee_limit,
            stake_limit: self.goc_stake_limit,
            action_fee: self.goc_action_fee,
            max_proposal_reward: self.goc_max_proposal_reward,
            governance_vote_period: self.goc_governance_vote_period,
            bp_vote_period: self.goc_bp_vote_period,
            vote_start_delay: self.goc_vote_start_time,
            bp_nay_threshold: self.goc_bp_nay_threshold,
            gn_drain_interval: self.goc_gn_drain_interval,
            voter_inflow_bps: self.goc_voter_inflow_bps,
            gn_inflow_bps: self.goc_gn_inflow_bps,
        }
    }

    pub fn apply_goc_params(&mut self, params: &GocParams) {
        self.goc_proposal_fee_limit = params.proposal_fee_limit;
        self.goc_stake_limit = params.stake_limit;
        self.goc_action_fee = params.action_fee;
        self.goc_max_proposal_reward = params.max_proposal_reward;
        self.goc_governance_vote_period = params.governance_vote_period;
        self.goc_bp_vote_period = params.bp_vote_period;
        self.goc_vote_start_time = params.vote_start_delay;
        self.goc_bp_nay_threshold = params.bp_nay_threshold;
        self.goc_gn_drain_interval = params.gn_drain_interval;
        self.goc_voter_inflow_bps = params.voter_inflow_bps;
        self.goc_gn_inflow_bps = params.gn_inflow_bps;
    }
}
