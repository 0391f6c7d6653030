//! Cut batches and loupe rows.

use crate::address::Address;
use crate::error::CoreError;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a single cut entry does to its selectors.
///
/// The numeric codes are part of the compatibility surface shared with
/// callers that encode cuts on the wire, so they serialize as integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum FacetCutAction {
    /// Register selectors that no facet owns yet.
    Add = 0,
    /// Move selectors to a different facet.
    Replace = 1,
    /// Unregister selectors. The cut's facet must be the null facet.
    Remove = 2,
}

impl FacetCutAction {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FacetCutAction {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FacetCutAction::Add),
            1 => Ok(FacetCutAction::Replace),
            2 => Ok(FacetCutAction::Remove),
            other => Err(CoreError::InvalidAction(other)),
        }
    }
}

impl From<FacetCutAction> for u8 {
    fn from(action: FacetCutAction) -> Self {
        action.as_u8()
    }
}

impl fmt::Display for FacetCutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetCutAction::Add => write!(f, "add"),
            FacetCutAction::Replace => write!(f, "replace"),
            FacetCutAction::Remove => write!(f, "remove"),
        }
    }
}

/// One `(facet, action, selectors)` triple of a cut batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCut {
    /// Target facet. Must be the null facet for [`FacetCutAction::Remove`].
    pub facet_address: Address,
    /// The action to apply.
    pub action: FacetCutAction,
    /// Selectors the action applies to, in order.
    pub function_selectors: Vec<Selector>,
}

impl FacetCut {
    pub fn new(
        facet_address: Address,
        action: FacetCutAction,
        function_selectors: impl IntoIterator<Item = Selector>,
    ) -> Self {
        Self {
            facet_address,
            action,
            function_selectors: function_selectors.into_iter().collect(),
        }
    }

    /// Add `selectors` to `facet`.
    pub fn add(facet: Address, selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self::new(facet, FacetCutAction::Add, selectors)
    }

    /// Point `selectors` at `facet`.
    pub fn replace(facet: Address, selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self::new(facet, FacetCutAction::Replace, selectors)
    }

    /// Remove `selectors`, keyed by selector only.
    pub fn remove(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self::new(Address::ZERO, FacetCutAction::Remove, selectors)
    }
}

/// A facet and the selectors it currently owns, as reported by the loupe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facet {
    pub facet_address: Address,
    pub function_selectors: Vec<Selector>,
}
