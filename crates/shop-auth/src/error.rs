//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login attempted without a user id.
    #[error("cannot log in without a user id")]
    MissingUserId,

    /// The identity could not be written to durable storage.
    #[error("cache error: {0}")]
    Cache(#[from] shop_cache::CacheError),
}

impl AuthError {
    /// Check if the caller supplied bad input (as opposed to a storage fault).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AuthError::MissingUserId)
    }
}
