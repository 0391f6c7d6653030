//! Structural invariants of the routing state.
//!
//! A committed registry always satisfies:
//! - Bijection: `selectors[s].facet == f` iff `s` is listed under `f`
//! - No orphans: a facet is known iff its selector list is non-empty
//! - Density: the dense sequence holds every selector exactly once
//! - Positions: every recorded position matches the sequence

use crate::registry::Registry;
use diamond_core::{Address, Selector};
use std::collections::HashSet;
use std::fmt;

/// A broken invariant, found by [`Registry::verify`] or while unwinding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The sequence, selector map and facet lists disagree on the count.
    Density {
        sequence: usize,
        indexed: usize,
        listed: usize,
    },
    /// A selector in the sequence has no routing entry.
    Unindexed(Selector),
    /// A routing entry records the wrong position.
    StalePosition {
        selector: Selector,
        recorded: usize,
        actual: usize,
    },
    /// A selector is listed under a facet that does not own it.
    Ownership {
        selector: Selector,
        listed_under: Address,
        owner: Option<Address>,
    },
    /// A selector appears twice in facet lists.
    DuplicateListing(Selector),
    /// A known facet has no selectors.
    OrphanFacet(Address),
    /// The null facet owns selectors.
    NullFacet,
    /// The facet enumeration order disagrees with the facet lists.
    FacetOrder,
    /// The slot table rejected an operation.
    SlotTable(String),
    /// Undoing a cut found state it did not expect.
    RollbackDiverged(Selector),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::Density {
                sequence,
                indexed,
                listed,
            } => write!(
                f,
                "density mismatch: {} in sequence, {} indexed, {} listed",
                sequence, indexed, listed
            ),
            InvariantViolation::Unindexed(s) => write!(f, "selector {} has no routing entry", s),
            InvariantViolation::StalePosition {
                selector,
                recorded,
                actual,
            } => write!(
                f,
                "selector {} recorded at {} but found at {}",
                selector, recorded, actual
            ),
            InvariantViolation::Ownership {
                selector,
                listed_under,
                owner,
            } => match owner {
                Some(owner) => write!(
                    f,
                    "selector {} listed under {} but owned by {}",
                    selector, listed_under, owner
                ),
                None => write!(
                    f,
                    "selector {} listed under {} but unowned",
                    selector, listed_under
                ),
            },
            InvariantViolation::DuplicateListing(s) => write!(f, "selector {} listed twice", s),
            InvariantViolation::OrphanFacet(a) => write!(f, "facet {} has no selectors", a),
            InvariantViolation::NullFacet => write!(f, "null facet owns selectors"),
            InvariantViolation::FacetOrder => write!(f, "facet order disagrees with facet lists"),
            InvariantViolation::SlotTable(e) => write!(f, "slot table: {}", e),
            InvariantViolation::RollbackDiverged(s) => {
                write!(f, "rollback diverged at selector {}", s)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

impl Registry {
    /// Check every structural invariant.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let listed: usize = self.facets.values().map(Vec::len).sum();
        let indexed = self.selectors.0.len();
        let sequence = self.slots.len();
        if sequence != indexed || indexed != listed {
            return Err(InvariantViolation::Density {
                sequence,
                indexed,
                listed,
            });
        }

        for (actual, selector) in self.slots.iter().enumerate() {
            let entry = self
                .selectors
                .0
                .get(&selector)
                .ok_or(InvariantViolation::Unindexed(selector))?;
            if entry.position != actual {
                return Err(InvariantViolation::StalePosition {
                    selector,
                    recorded: entry.position,
                    actual,
                });
            }
        }

        let mut seen = HashSet::with_capacity(listed);
        for (facet, list) in &self.facets {
            if facet.is_zero() {
                return Err(InvariantViolation::NullFacet);
            }
            if list.is_empty() {
                return Err(InvariantViolation::OrphanFacet(*facet));
            }
            for selector in list {
                if !seen.insert(*selector) {
                    return Err(InvariantViolation::DuplicateListing(*selector));
                }
                let owner = self.selectors.0.get(selector).map(|e| e.facet);
                if owner != Some(*facet) {
                    return Err(InvariantViolation::Ownership {
                        selector: *selector,
                        listed_under: *facet,
                        owner,
                    });
                }
            }
        }

        let ordered: HashSet<&Address> = self.facet_order.iter().collect();
        if ordered.len() != self.facet_order.len()
            || ordered.len() != self.facets.len()
            || !self.facets.keys().all(|f| ordered.contains(f))
        {
            return Err(InvariantViolation::FacetOrder);
        }

        Ok(())
    }
}
