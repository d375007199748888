//! Timestamp types used throughout the contract.
//!
//! `Timestamp` is Unix epoch seconds (UTC) and is what every time window is
//! compared against. `BlockTimestamp` is the half-second block slot counted
//! from 2000-01-01T00:00:00Z, as delivered by the block hook.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SECONDS_PER_DAY: u64 = 24 * 3600;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero). Also used as "never" for optional times.
    pub const EPOCH: Self = Self(0);

    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn is_epoch(&self) -> bool {
        self.0 == 0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }

    pub fn plus(&self, secs: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A block slot: half-second intervals since 2000-01-01T00:00:00Z.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockTimestamp(u32);

impl BlockTimestamp {
    /// Unix seconds of slot zero.
    pub const EPOCH_SECS: u64 = 946_684_800;
    pub const SLOTS_PER_MINUTE: u32 = 120;
    pub const SLOTS_PER_DAY: u32 = 2 * 24 * 3600;

    pub const fn from_slot(slot: u32) -> Self {
        Self(slot)
    }

    /// The slot containing `ts`; times before slot zero map to slot zero.
    pub fn from_timestamp(ts: Timestamp) -> Self {
        let slot = ts.as_secs().saturating_sub(Self::EPOCH_SECS) * 2;
        Self(u32::try_from(slot).unwrap_or(u32::MAX))
    }

    pub const fn slot(&self) -> u32 {
        self.0
    }

    /// Whole seconds of the slot start.
    pub fn to_timestamp(&self) -> Timestamp {
        Timestamp::new(Self::EPOCH_SECS + u64::from(self.0) / 2)
    }

    /// Slots elapsed since `earlier` (saturating).
    pub fn slots_since(&self, earlier: BlockTimestamp) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}
