use goc_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{table}: row {key} not found")]
    NotFound { table: &'static str, key: String },

    #[error("{table}: duplicate key {key}")]
    Duplicate { table: &'static str, key: String },

    #[error("{table}: primary key of row {key} changed during modify")]
    KeyChanged { table: &'static str, key: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("state is corrupted: {0}")]
    Corruption(String),

    #[error("state schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Storage,
        }
    }
}
