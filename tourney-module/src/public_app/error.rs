use thiserror::Error;
use tourney_common::error::StoreError;

#[derive(Debug, Error)]
pub(crate) enum PublicError {
    #[error("Config error")]
    Config,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Malformed email address: {0}")]
    InvalidEmail(String),
    #[error("Store error {0}")]
    Store(#[from] StoreError),
}
