//! Interfaces to everything the system contract does not own.
//!
//! The contract never calls a collaborator directly while an action is
//! running. It records [`Effect`]s instead, and [`Host::commit`] hands them
//! over once the action has succeeded.

pub mod effects;
pub mod error;
pub mod traits;

pub use effects::{Effect, Effects, Host};
pub use error::HostError;
pub use traits::{
    AccountRegistry, DeferredAction, DeferredKey, DeferredScheduler, DeferredTask, ProducerKey,
    ScheduleSink, TokenLedger, TokenOp,
};
