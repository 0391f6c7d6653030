//! Error types for the registry.

use crate::verify::InvariantViolation;
use diamond_core::{Address, FacetCutAction, Selector};
use thiserror::Error;

/// Why a cut was rejected. Whatever the variant, the registry is left in
/// the state it had before the cut.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CutError {
    #[error("Selector {0} already exists")]
    DuplicateSelector(Selector),

    #[error("Invalid facet {facet} for {action} cut")]
    InvalidFacet {
        action: FacetCutAction,
        facet: Address,
    },

    #[error("Selector {0} is already owned by the replacement facet")]
    NoOpReplace(Selector),

    #[error("Selector {0} not found")]
    SelectorNotFound(Selector),

    #[error("Post-cut hook failed: {0}")]
    PostHookFailed(String),

    #[error("Cut names {found} selectors, limit is {limit}")]
    CutTooLarge { limit: usize, found: usize },

    #[error("Invariant violated: {0}")]
    Invariant(InvariantViolation),
}

/// Errors from registry persistence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Snapshot version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CutError>;
