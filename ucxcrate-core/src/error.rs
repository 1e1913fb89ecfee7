//! Error types for ucxcrate

use thiserror::Error;

/// Main error type for collision proxy operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No active selection: a source mesh is required")]
    NoActiveSelection,

    #[error("Insufficient input: at least {required} points required, got {found}")]
    InsufficientInput { required: usize, found: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl Error {
    /// Shorthand for [`Error::DegenerateInput`]
    pub fn degenerate(message: impl Into<String>) -> Self {
        Error::DegenerateInput(message.into())
    }

    /// Shorthand for [`Error::InvalidData`]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData(message.into())
    }

    /// Shorthand for [`Error::InvalidConfiguration`]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}

/// Result type alias for ucxcrate operations
pub type Result<T> = std::result::Result<T, Error>;
