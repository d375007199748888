use goc_store::StoreError;
use goc_types::{AccountName, ErrorKind};
use thiserror::Error;

use crate::voter::MAX_PRODUCERS_PER_VOTE;

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("user {0} must stake before they can vote")]
    VoterNotFound(AccountName),

    #[error("producer {0} is not registered")]
    ProducerNotFound(AccountName),

    #[error("producer {0} is not currently registered")]
    ProducerInactive(AccountName),

    #[error("attempt to vote for too many producers ({0} > {max})", max = MAX_PRODUCERS_PER_VOTE)]
    TooManyProducers(usize),

    #[error("producer {0} appears more than once")]
    DuplicateProducer(AccountName),

    #[error("cannot vote for producers and proxy at same time")]
    ProxyAndProducers,

    #[error("cannot proxy to self")]
    SelfProxy,

    #[error("proxy {0} not found")]
    ProxyNotFound(AccountName),

    #[error("{0} is not registered as a proxy")]
    NotAProxy(AccountName),

    #[error("account {0} registered as a proxy is not allowed to use a proxy")]
    ProxyUsesProxy(AccountName),

    #[error("action has no effect")]
    NoEffect,

    #[error("stake for voting cannot be negative")]
    NegativeStake,

    #[error("url too long ({0} bytes)")]
    UrlTooLong(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl VotingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VoterNotFound(_)
            | Self::ProducerNotFound(_)
            | Self::ProducerInactive(_)
            | Self::ProxyNotFound(_) => ErrorKind::NotFound,
            Self::TooManyProducers(_) => ErrorKind::LimitExceeded,
            Self::DuplicateProducer(_)
            | Self::ProxyAndProducers
            | Self::SelfProxy
            | Self::NotAProxy(_)
            | Self::ProxyUsesProxy(_)
            | Self::NoEffect
            | Self::UrlTooLong(_) => ErrorKind::InvalidArgument,
            Self::NegativeStake => ErrorKind::InsufficientBalance,
            Self::Store(e) => e.kind(),
        }
    }
}
