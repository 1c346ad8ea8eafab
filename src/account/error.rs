use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("email already registered: {email}")]
    DuplicateIdentity { email: String },

    #[error("invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
