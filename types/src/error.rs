//! Error taxonomy shared across crates.
//!
//! Every crate keeps its own error enum; each of them classifies itself into
//! one `ErrorKind` so that a rejected action always reports a stable kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of a rejected action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Non-positive or wrong-denomination quantity.
    InvalidAmount,
    /// Malformed argument (duplicate entries, oversized strings, bad names).
    InvalidArgument,
    /// Caller lacks the authority required for the target account.
    Unauthorized,
    /// Referenced voter, producer, proposal, bid or record is absent.
    NotFound,
    /// Action attempted outside its valid time range.
    OutOfWindow,
    /// A fee, stake or list-size cap was violated.
    LimitExceeded,
    /// Terminal-state re-entry on a settled proposal.
    AlreadySettled,
    /// Terminal-state re-entry on a claimed reward or auction.
    AlreadyClaimed,
    /// Quota or reserve violation.
    InsufficientBalance,
    /// RAM reservation would exceed the global maximum.
    CapacityExceeded,
    /// An external collaborator refused the effect.
    Host,
    /// Corrupt or incompatible persisted state.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidArgument => "invalid_argument",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::OutOfWindow => "out_of_window",
            Self::LimitExceeded => "limit_exceeded",
            Self::AlreadySettled => "already_settled",
            Self::AlreadyClaimed => "already_claimed",
            Self::InsufficientBalance => "insufficient_balance",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::Host => "host",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

/// Parse failures for the textual forms of names, symbols, assets and keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid account name: {0}")]
    InvalidName(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    #[error("invalid public key: {0}")]
    InvalidKey(String),
}
