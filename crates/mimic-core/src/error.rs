//! Error types for Mimic

use thiserror::Error;

/// Core Mimic errors
#[derive(Error, Debug)]
pub enum MimicError {
    // Wire errors
    #[error("Encode error: {0}")]
    EncodeError(String),

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Bind failed on {addr}: {reason}")]
    BindFailed { addr: String, reason: String },

    // Configuration errors
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Mimic operations
pub type MimicResult<T> = Result<T, MimicError>;
