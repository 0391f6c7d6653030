//! Error types for parsing and decoding core values.

use thiserror::Error;

/// Errors raised while decoding selectors, addresses and cut actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Invalid facet cut action code: {0}")]
    InvalidAction(u8),
}

pub type Result<T> = std::result::Result<T, CoreError>;
