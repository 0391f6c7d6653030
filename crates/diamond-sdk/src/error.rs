//! Error types for the diamond SDK.

use diamond_core::{Address, Selector};
use diamond_registry::{CutError, RegistryError};
use thiserror::Error;

/// Error type for diamond operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiamondError {
    /// The caller may not perform an owner-only operation.
    #[error("Caller {0} is not authorized")]
    Unauthorized(Address),

    /// No facet handles the selector.
    #[error("Diamond: Function {0} does not exist")]
    FunctionNotFound(Selector),

    #[error(transparent)]
    Cut(#[from] CutError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for diamond operations.
pub type Result<T> = std::result::Result<T, DiamondError>;
