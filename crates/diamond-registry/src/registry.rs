//! Registry state and its primitive mutations.
//!
//! Three structures make up the routing state:
//! - `selectors`: selector → (owning facet, logical position)
//! - `facets`: facet → its selectors, in the order they were attached
//! - `slots`: the dense selector sequence that removal compacts
//!
//! `facet_order` records the order facets first became known and is what
//! the loupe enumerates. A facet is known exactly while its selector list
//! is non-empty.
//!
//! The primitives below each perform one selector-level change and return
//! the [`UndoEntry`] that reverses it. They assume the caller has already
//! validated the change.

use crate::config::RegistryConfig;
use crate::error::CutError;
use crate::undo::UndoEntry;
use crate::verify::InvariantViolation;
use diamond_compaction::{CompactionStats, Compactor, PositionIndex, SelectorSlots};
use diamond_core::{Address, FacetCut, Selector};
use std::collections::HashMap;

/// Where a selector routes to and where it sits in the dense sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SelectorEntry {
    pub facet: Address,
    pub position: usize,
}

/// Selector → entry map, the compactor's position index.
#[derive(Clone, Debug, Default)]
pub(crate) struct SelectorTable(pub HashMap<Selector, SelectorEntry>);

impl PositionIndex for SelectorTable {
    fn set_position(&mut self, selector: Selector, position: usize) {
        if let Some(entry) = self.0.get_mut(&selector) {
            entry.position = position;
        }
    }
}

/// The authoritative selector-routing registry.
///
/// Mutated only through [`cut`](Registry::cut); every other method is a
/// read-only query over the last committed state.
#[derive(Clone, Debug)]
pub struct Registry {
    pub(crate) config: RegistryConfig,
    pub(crate) selectors: SelectorTable,
    pub(crate) facets: HashMap<Address, Vec<Selector>>,
    pub(crate) facet_order: Vec<Address>,
    pub(crate) slots: SelectorSlots,
    pub(crate) compactor: Compactor,
    pub(crate) generation: u64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Registry {
            config,
            selectors: SelectorTable::default(),
            facets: HashMap::new(),
            facet_order: Vec::new(),
            slots: SelectorSlots::new(),
            compactor: Compactor::new(),
            generation: 0,
        }
    }

    /// Create a registry pre-populated by an initial cut.
    pub fn with_cuts(config: RegistryConfig, cuts: &[FacetCut]) -> Result<Self, CutError> {
        let mut registry = Registry::new(config);
        registry.apply(cuts)?;
        Ok(registry)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of committed cuts.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Compaction work performed so far, including work later rolled back.
    pub fn compaction_stats(&self) -> &CompactionStats {
        self.compactor.stats()
    }

    /// Attach a new selector to `facet`, appending it to the dense sequence.
    pub(crate) fn insert_selector(&mut self, selector: Selector, facet: Address) -> UndoEntry {
        let position = self.slots.push(selector);
        self.selectors
            .0
            .insert(selector, SelectorEntry { facet, position });
        let facet_created = self.attach(facet, selector);

        UndoEntry::Added {
            selector,
            facet,
            facet_created,
        }
    }

    /// Move an existing selector to a different facet. Its position in the
    /// dense sequence does not change.
    pub(crate) fn transfer_selector(
        &mut self,
        selector: Selector,
        to: Address,
    ) -> Result<UndoEntry, CutError> {
        let entry = self
            .selectors
            .0
            .get_mut(&selector)
            .ok_or(CutError::SelectorNotFound(selector))?;
        let from = entry.facet;
        entry.facet = to;

        let (from_index, from_dropped) = self.detach(from, selector)?;
        let to_created = self.attach(to, selector);

        Ok(UndoEntry::Replaced {
            selector,
            from,
            from_index,
            from_dropped,
            to,
            to_created,
        })
    }

    /// Remove a selector, compacting the dense sequence.
    pub(crate) fn remove_selector(&mut self, selector: Selector) -> Result<UndoEntry, CutError> {
        let entry = self
            .selectors
            .0
            .remove(&selector)
            .ok_or(CutError::SelectorNotFound(selector))?;

        let relocation = self
            .compactor
            .remove(&mut self.slots, entry.position, &mut self.selectors)
            .map_err(|e| CutError::Invariant(InvariantViolation::SlotTable(e.to_string())))?;
        let (facet_index, facet_dropped) = self.detach(entry.facet, selector)?;

        if let Some(moved) = relocation.moved {
            tracing::trace!(
                removed = %selector,
                moved = %moved,
                position = relocation.position,
                "relocated last selector"
            );
        }

        Ok(UndoEntry::Removed {
            relocation,
            facet: entry.facet,
            facet_index,
            facet_dropped,
        })
    }

    /// Append `selector` to `facet`'s list. Returns true if the facet was
    /// not known before.
    fn attach(&mut self, facet: Address, selector: Selector) -> bool {
        let list = self.facets.entry(facet).or_default();
        let created = list.is_empty();
        list.push(selector);
        if created {
            self.facet_order.push(facet);
        }
        created
    }

    /// Take `selector` out of `facet`'s list. Returns its index in the list
    /// and, when the facet lost its last selector, the facet's former index
    /// in the enumeration order.
    fn detach(
        &mut self,
        facet: Address,
        selector: Selector,
    ) -> Result<(usize, Option<usize>), CutError> {
        let list = self
            .facets
            .get_mut(&facet)
            .ok_or(CutError::SelectorNotFound(selector))?;
        let index = list
            .iter()
            .position(|s| *s == selector)
            .ok_or(CutError::SelectorNotFound(selector))?;
        list.remove(index);

        if !list.is_empty() {
            return Ok((index, None));
        }

        self.facets.remove(&facet);
        let order_index = self.facet_order.iter().position(|f| *f == facet);
        if let Some(i) = order_index {
            self.facet_order.remove(i);
        }
        Ok((index, order_index))
    }
}
