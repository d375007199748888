//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the system contract talks to has an in-memory
//! implementation here that:
//! - Returns deterministic values
//! - Can be inspected and steered programmatically
//! - Never touches the filesystem or network
//!
//! Usage: build a [`NullHost`], hand `host()` to the contract, and keep the
//! `Arc`s to assert on what the contract asked for.

pub mod accounts;
pub mod clock;
pub mod deferred;
pub mod schedule;
pub mod tokens;

use std::sync::{Arc, Mutex, MutexGuard};

use goc_host::Host;

pub use accounts::{AccountRecord, NullAccounts};
pub use clock::NullClock;
pub use deferred::NullScheduler;
pub use schedule::NullScheduleSink;
pub use tokens::NullTokenLedger;

/// Lock `m`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A full set of nullable collaborators.
#[derive(Clone, Default)]
pub struct NullHost {
    pub tokens: Arc<NullTokenLedger>,
    pub accounts: Arc<NullAccounts>,
    pub schedule: Arc<NullScheduleSink>,
    pub deferred: Arc<NullScheduler>,
}

impl NullHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&self) -> Host {
        Host::new(
            self.tokens.clone(),
            self.accounts.clone(),
            self.schedule.clone(),
            self.deferred.clone(),
        )
    }
}
