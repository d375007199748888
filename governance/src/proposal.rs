//! Governance proposals and their lifecycle.

use goc_store::{Field, Persisted, Row, SecondaryKey, Schema};
use goc_types::{AccountName, Asset, GlobalState, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::GocError;

pub const MAX_PROPOSAL_NAME_LEN: usize = 256;
pub const MAX_PROPOSAL_CONTENT_LEN: usize = 32 * 1024;
pub const MAX_PROPOSAL_URL_LEN: usize = 512;

/// Where a proposal stands at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalPhase {
    /// Submitted, waiting for account voting to open. The owner may still edit it.
    Created,
    /// Staked accounts vote yea or nay.
    AccountVoting,
    /// Elected producers ratify or object.
    ProducerVoting,
    /// Producer voting closed; waiting for settlement.
    AwaitingSettlement,
    /// Terminal.
    Settled,
}

/// How soon voting opens after submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// Account voting opens after the configured start delay.
    #[default]
    Normal,
    /// Account voting opens immediately.
    SkipWait,
    /// Producer voting opens immediately; no account voting window.
    SkipAccountVote,
}

impl StartMode {
    pub fn is_debug(&self) -> bool {
        !matches!(self, StartMode::Normal)
    }
}

impl TryFrom<u16> for StartMode {
    type Error = u16;

    fn try_from(raw: u16) -> Result<Self, u16> {
        match raw {
            0 => Ok(StartMode::Normal),
            1 => Ok(StartMode::SkipWait),
            2 => Ok(StartMode::SkipAccountVote),
            other => Err(other),
        }
    }
}

/// The vote windows of a proposal submitted at `now`.
///
/// Always `vote_starttime <= bp_vote_starttime <= bp_vote_endtime`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteWindows {
    pub vote_starttime: Timestamp,
    pub bp_vote_starttime: Timestamp,
    pub bp_vote_endtime: Timestamp,
}

impl VoteWindows {
    pub fn plan(now: Timestamp, mode: StartMode, global: &GlobalState) -> Self {
        let (vote_starttime, bp_vote_starttime) = match mode {
            StartMode::Normal => {
                let start = now.plus(global.goc_vote_start_time);
                (start, start.plus(global.goc_governance_vote_period))
            }
            StartMode::SkipWait => (now, now.plus(global.goc_governance_vote_period)),
            StartMode::SkipAccountVote => (now, now),
        };
        Self {
            vote_starttime,
            bp_vote_starttime,
            bp_vote_endtime: bp_vote_starttime.plus(global.goc_bp_vote_period),
        }
    }
}

/// A staked governance proposal. Never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GocProposal {
    pub id: u64,
    pub owner: AccountName,
    /// Escrowed until settlement.
    pub fee: Asset,
    pub proposal_name: String,
    pub proposal_content: String,
    pub url: String,

    pub create_time: Timestamp,
    pub vote_starttime: Timestamp,
    pub bp_vote_starttime: Timestamp,
    pub bp_vote_endtime: Timestamp,

    /// `Timestamp::EPOCH` until settled.
    pub settle_time: Timestamp,
    pub reward: Asset,

    pub total_yeas: f64,
    pub total_nays: f64,
    pub total_voter: u64,
    /// Minus one per producer objecting.
    pub bp_nays: f64,
    pub total_bp: u16,
    pub passed: bool,
}

impl GocProposal {
    pub fn is_settled(&self) -> bool {
        !self.settle_time.is_epoch()
    }

    pub fn phase(&self, now: Timestamp) -> ProposalPhase {
        if self.is_settled() {
            ProposalPhase::Settled
        } else if now < self.vote_starttime {
            ProposalPhase::Created
        } else if now < self.bp_vote_starttime {
            ProposalPhase::AccountVoting
        } else if now < self.bp_vote_endtime {
            ProposalPhase::ProducerVoting
        } else {
            ProposalPhase::AwaitingSettlement
        }
    }

    pub fn vote_pass(&self) -> bool {
        self.total_yeas > self.total_nays
    }

    pub fn bp_pass(&self, threshold: f64) -> bool {
        self.bp_nays >= threshold
    }

    pub(crate) fn window_error(&self, now: Timestamp, start: Timestamp, end: Timestamp) -> GocError {
        GocError::OutOfWindow {
            id: self.id,
            now,
            start,
            end,
        }
    }
}

/// Check the text fields of a proposal against their size limits.
pub fn validate_text(name: &str, content: &str, url: &str) -> Result<(), GocError> {
    for (field, value, max) in [
        ("proposal name", name, MAX_PROPOSAL_NAME_LEN),
        ("proposal content", content, MAX_PROPOSAL_CONTENT_LEN),
        ("url", url, MAX_PROPOSAL_URL_LEN),
    ] {
        if value.len() > max {
            return Err(GocError::TextTooLong {
                field,
                len: value.len(),
                max,
            });
        }
    }
    Ok(())
}

impl Row for GocProposal {
    type Key = u64;
    const TABLE: &'static str = "proposals";

    fn primary_key(&self) -> u64 {
        self.id
    }
}

/// Unsettled proposals first, each group by producer-vote end time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByEndTime;

impl SecondaryKey<GocProposal> for ByEndTime {
    type Key = (bool, Timestamp);

    fn key(row: &GocProposal) -> Self::Key {
        (row.is_settled(), row.bp_vote_endtime)
    }
}

impl Persisted for GocProposal {
    const SCHEMA: Schema = Schema {
        entity: "goc_proposal_info",
        table: "proposals",
        version: 1,
        fields: &[
            Field::new("id", "uint64"),
            Field::new("owner", "name"),
            Field::new("fee", "asset"),
            Field::new("proposal_name", "string"),
            Field::new("proposal_content", "string"),
            Field::new("url", "string"),
            Field::new("create_time", "time"),
            Field::new("vote_starttime", "time"),
            Field::new("bp_vote_starttime", "time"),
            Field::new("bp_vote_endtime", "time"),
            Field::new("settle_time", "time"),
            Field::new("reward", "asset"),
            Field::new("total_yeas", "float64"),
            Field::new("total_nays", "float64"),
            Field::new("total_voter", "uint64"),
            Field::new("bp_nays", "float64"),
            Field::new("total_bp", "uint16"),
            Field::new("passed", "bool"),
        ],
    };
}
