//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while constructing or parsing the fundamental types.
#[derive(Debug, Error)]
pub enum BnmsError {
    #[error("invalid unique identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid network id: {0}")]
    InvalidNetworkId(String),

    #[error("invalid party: {0}")]
    InvalidParty(String),

    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
