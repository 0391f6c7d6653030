//! Undo log for in-flight cuts.
//!
//! Each primitive mutation records the inverse information needed to put
//! the registry back exactly as it was: slot layout, per-facet selector
//! order and facet enumeration order included. A failed cut replays its
//! log newest-first.

use crate::error::CutError;
use crate::registry::{Registry, SelectorEntry};
use crate::verify::InvariantViolation;
use diamond_compaction::Relocation;
use diamond_core::{Address, Selector};

/// The inverse of one selector-level mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum UndoEntry {
    /// A selector was appended to the sequence and to `facet`'s list.
    Added {
        selector: Selector,
        facet: Address,
        facet_created: bool,
    },
    /// A selector moved from `from` (at `from_index` in its list) to `to`.
    Replaced {
        selector: Selector,
        from: Address,
        from_index: usize,
        from_dropped: Option<usize>,
        to: Address,
        to_created: bool,
    },
    /// A selector was compacted out of the sequence.
    Removed {
        relocation: Relocation,
        facet: Address,
        facet_index: usize,
        facet_dropped: Option<usize>,
    },
}

impl UndoEntry {
    /// True for a removal that moved the last selector into a gap.
    pub fn relocated(&self) -> bool {
        matches!(self, UndoEntry::Removed { relocation, .. } if relocation.moved.is_some())
    }
}

/// Undo entries for the cut currently being applied.
#[derive(Debug, Default)]
pub(crate) struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries newest-first.
    pub fn drain_rev(&mut self) -> impl Iterator<Item = UndoEntry> + '_ {
        self.entries.drain(..).rev()
    }
}

impl Registry {
    /// Replay `log` newest-first, restoring the pre-cut state.
    pub(crate) fn rollback(&mut self, mut log: UndoLog) -> Result<(), CutError> {
        for entry in log.drain_rev() {
            self.revert(entry)?;
        }
        Ok(())
    }

    fn revert(&mut self, entry: UndoEntry) -> Result<(), CutError> {
        match entry {
            UndoEntry::Added {
                selector,
                facet,
                facet_created,
            } => {
                self.selectors.0.remove(&selector);
                match self.slots.pop() {
                    Some((last, _)) if last == selector => {}
                    _ => return Err(rollback_diverged(selector)),
                }
                self.unattach(facet, selector, facet_created)?;
            }

            UndoEntry::Replaced {
                selector,
                from,
                from_index,
                from_dropped,
                to,
                to_created,
            } => {
                self.unattach(to, selector, to_created)?;
                self.reattach(from, selector, from_index, from_dropped);
                let entry = self
                    .selectors
                    .0
                    .get_mut(&selector)
                    .ok_or_else(|| rollback_diverged(selector))?;
                entry.facet = from;
            }

            UndoEntry::Removed {
                relocation,
                facet,
                facet_index,
                facet_dropped,
            } => {
                let selector = relocation.removed;
                self.reattach(facet, selector, facet_index, facet_dropped);
                self.selectors.0.insert(
                    selector,
                    SelectorEntry {
                        facet,
                        position: relocation.position,
                    },
                );
                self.compactor
                    .restore(&mut self.slots, &relocation, &mut self.selectors)
                    .map_err(|e| CutError::Invariant(InvariantViolation::SlotTable(e.to_string())))?;
            }
        }
        Ok(())
    }

    /// Reverse an append of `selector` to `facet`'s list.
    fn unattach(&mut self, facet: Address, selector: Selector, created: bool) -> Result<(), CutError> {
        let list = self
            .facets
            .get_mut(&facet)
            .ok_or_else(|| rollback_diverged(selector))?;
        if list.pop() != Some(selector) {
            return Err(rollback_diverged(selector));
        }
        if created {
            self.facets.remove(&facet);
            if self.facet_order.last() == Some(&facet) {
                self.facet_order.pop();
            }
        }
        Ok(())
    }

    /// Put `selector` back at `index` in `facet`'s list, re-registering the
    /// facet at its former enumeration index if it had been dropped.
    fn reattach(&mut self, facet: Address, selector: Selector, index: usize, dropped: Option<usize>) {
        if let Some(order_index) = dropped {
            let order_index = order_index.min(self.facet_order.len());
            self.facet_order.insert(order_index, facet);
        }
        let list = self.facets.entry(facet).or_default();
        let index = index.min(list.len());
        list.insert(index, selector);
    }
}

fn rollback_diverged(selector: Selector) -> CutError {
    CutError::Invariant(InvariantViolation::RollbackDiverged(selector))
}
