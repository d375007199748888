use goc_store::StoreError;
use goc_types::{AccountName, Asset, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GocError {
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("fee must be a positive amount, got {0}")]
    InvalidFee(Asset),

    #[error("fee {fee} exceeds the proposal fee limit of {limit}")]
    FeeTooHigh { fee: Asset, limit: i64 },

    #[error("{owner} has {staked} staked, at least {required} is required to propose")]
    InsufficientStake {
        owner: AccountName,
        staked: i64,
        required: i64,
    },

    #[error("{field} too long ({len} > {max} bytes)")]
    TextTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("only the proposal owner may modify proposal {0}")]
    NotOwner(u64),

    #[error("proposal {id} does not accept this action at {now} (window {start}..{end})")]
    OutOfWindow {
        id: u64,
        now: Timestamp,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("{0} has no stake to vote with")]
    NoStake(AccountName),

    #[error("{0} is not an elected producer")]
    NotElected(AccountName),

    #[error("proposal {0} is already settled")]
    AlreadySettled(u64),

    #[error("no pending governance reward for {0}")]
    NothingToClaim(AccountName),

    #[error("{0} owns an unsettled proposal")]
    OpenProposal(AccountName),

    #[error("{0} is already governance-staked")]
    AlreadyStaked(AccountName),

    #[error("{0} has no governance stake")]
    NotStaked(AccountName),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Voting(#[from] goc_voting::VotingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GocError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProposalNotFound(_) | Self::NothingToClaim(_) => ErrorKind::NotFound,
            Self::InvalidFee(_) => ErrorKind::InvalidAmount,
            Self::FeeTooHigh { .. } | Self::InsufficientStake { .. } => ErrorKind::LimitExceeded,
            Self::TextTooLong { .. } | Self::OpenProposal(_) | Self::AlreadyStaked(_) => {
                ErrorKind::InvalidArgument
            }
            Self::NotOwner(_) | Self::NotElected(_) => ErrorKind::Unauthorized,
            Self::OutOfWindow { .. } => ErrorKind::OutOfWindow,
            Self::NoStake(_) | Self::NotStaked(_) => ErrorKind::InsufficientBalance,
            Self::AlreadySettled(_) => ErrorKind::AlreadySettled,
            Self::Overflow(_) => ErrorKind::LimitExceeded,
            Self::Voting(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
