//! The GOC system contract.
//!
//! [`SystemContract`] owns the persisted [`SystemState`] and executes
//! [`Action`]s against it. Each action runs inside a checkpoint: state
//! changes and collaborator [`goc_host::Effect`]s are either all applied or
//! none are.
//!
//! - [`bandwidth`], [`ram`]: staking, refunds and the RAM market.
//! - [`producers`], [`producer_pay`]: registration, voting and rewards.
//! - [`governance`], [`auction`]: proposals and premium names.
//! - [`onblock`]: the per-block hook.

pub mod accounts;
pub mod action;
mod admin;
mod auction;
mod bandwidth;
pub mod config;
pub mod contract;
pub mod error;
mod governance;
mod onblock;
pub mod producer_pay;
mod producers;
mod ram;
pub mod state;

pub use action::{Action, Authority};
pub use config::SystemConfig;
pub use contract::SystemContract;
pub use error::SystemError;
pub use producer_pay::InflationSplit;
pub use state::{SystemState, STATE_VERSION};
