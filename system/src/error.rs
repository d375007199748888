use goc_governance::{GocError, StartMode};
use goc_host::HostError;
use goc_names::AuctionError;
use goc_resources::ResourceError;
use goc_store::StoreError;
use goc_types::{AccountName, Asset, ErrorKind, Symbol, Timestamp};
use goc_voting::VotingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("voting error: {0}")]
    Voting(#[from] VotingError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("governance error: {0}")]
    Governance(#[from] GocError),

    #[error("name auction error: {0}")]
    Auction(#[from] AuctionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("missing authority of {required} (signed by {signer})")]
    MissingAuthority {
        required: AccountName,
        signer: AccountName,
    },

    #[error("expected a quantity in {expected}, got {got}")]
    WrongSymbol { expected: Symbol, got: Asset },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot {0} until the chain is activated")]
    NotActivated(&'static str),

    #[error("already claimed rewards within past day (last claim {last_claim}, now {now})")]
    ClaimTooSoon {
        last_claim: Timestamp,
        now: Timestamp,
    },

    #[error("{owner} cannot release {requested}: {locked} is locked by governance staking")]
    GovernanceStakeLocked {
        owner: AccountName,
        requested: i64,
        locked: i64,
    },

    #[error("start mode {0:?} is disabled on this network")]
    DebugStartMode(StartMode),

    #[error("config error: {0}")]
    Config(String),
}

impl SystemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Voting(e) => e.kind(),
            Self::Resource(e) => e.kind(),
            Self::Governance(e) => e.kind(),
            Self::Auction(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Host(e) => e.kind(),
            Self::MissingAuthority { .. } => ErrorKind::Unauthorized,
            Self::WrongSymbol { .. } => ErrorKind::InvalidAmount,
            Self::InvalidArgument(_) | Self::DebugStartMode(_) | Self::Config(_) => {
                ErrorKind::InvalidArgument
            }
            Self::NotActivated(_) | Self::ClaimTooSoon { .. } => ErrorKind::OutOfWindow,
            Self::GovernanceStakeLocked { .. } => ErrorKind::InsufficientBalance,
        }
    }
}
