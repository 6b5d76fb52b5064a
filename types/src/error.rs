//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid XPR account name format")]
    InvalidAccountName(String),

    #[error("Name must be 2-30 characters")]
    NameLength(usize),

    #[error("Name can only contain letters, numbers, hyphens, underscores")]
    NameCharacters(String),

    #[error("invalid identity id: {0}")]
    InvalidIdentityId(String),
}
