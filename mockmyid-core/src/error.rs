//! Error types for MockMyID token issuance

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid validity window: expires at {expires_at} is not after issued at {issued_at}")]
    InvalidValidity { issued_at: i64, expires_at: i64 },
}
