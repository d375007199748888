//! Fundamental types for the GOC system contract.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account names, assets and symbols, timestamps, public keys, the global state
//! singleton and the error taxonomy every action failure maps onto.

pub mod asset;
pub mod error;
pub mod global;
pub mod keys;
pub mod name;
pub mod time;

pub use asset::{Asset, Symbol};
pub use error::{ErrorKind, ParseError};
pub use global::{ChainParameters, GlobalState, GocParams};
pub use keys::PublicKey;
pub use name::AccountName;
pub use time::{BlockTimestamp, Timestamp, SECONDS_PER_DAY};
