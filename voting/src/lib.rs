//! Producer voting for the GOC system contract.
//!
//! - [`weight`]: stake to vote-weight conversion.
//! - [`delta`]: the pure signed-delta computation behind every vote change.
//! - [`registry`]: voters, proxies and the single place deltas are applied.
//! - [`producer`] and [`election`]: producer records and the top-21 schedule.

pub mod delta;
pub mod election;
pub mod error;
pub mod producer;
pub mod registry;
pub mod voter;
pub mod weight;

pub use delta::{compute_deltas, Ballot, DeltaSet, ProducerDelta};
pub use election::{Election, MAX_SCHEDULE_SIZE};
pub use error::VotingError;
pub use producer::{ByTotalVotes, ProducerInfo, ProducerRegistry, MAX_URL_LEN};
pub use registry::VoterRegistry;
pub use voter::{VoterInfo, MAX_PRODUCERS_PER_VOTE};
pub use weight::VoteWeightEngine;
