//! Swap-and-shrink compaction.
//!
//! Removing the selector at position `p` out of `n` moves the selector at
//! `n - 1` into `p` and shrinks the sequence by one. The caller's position
//! index is kept in sync through [`PositionIndex`].

use crate::slots::{SelectorSlots, SlotError};
use diamond_core::Selector;
use std::collections::HashMap;

/// The cross-reference from selector to logical position that must follow
/// every relocation.
pub trait PositionIndex {
    /// Record that `selector` now lives at `position`.
    fn set_position(&mut self, selector: Selector, position: usize);
}

impl PositionIndex for HashMap<Selector, usize> {
    fn set_position(&mut self, selector: Selector, position: usize) {
        if let Some(slot) = self.get_mut(&selector) {
            *slot = position;
        }
    }
}

/// What one removal did to the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocation {
    /// The selector that left the sequence.
    pub removed: Selector,
    /// Where it was.
    pub position: usize,
    /// The former last selector, now living at `position`. `None` when the
    /// removed selector was itself the last one.
    pub moved: Option<Selector>,
}

/// Statistics about compaction work.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Selectors removed.
    pub removals: u64,

    /// Removals that had to move the last selector into a gap.
    pub relocations: u64,

    /// Slots released because their last occupied cell was vacated.
    pub slots_released: u64,
}

/// Performs removals against a [`SelectorSlots`] table.
#[derive(Clone, Debug, Default)]
pub struct Compactor {
    stats: CompactionStats,
}

impl Compactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &CompactionStats {
        &self.stats
    }

    /// Remove the selector at `position`.
    ///
    /// The last selector is taken from `slots` itself on every call and the
    /// relocated value is written back before this returns, so consecutive
    /// removals always observe each other's writes.
    pub fn remove<I>(
        &mut self,
        slots: &mut SelectorSlots,
        position: usize,
        index: &mut I,
    ) -> Result<Relocation, SlotError>
    where
        I: PositionIndex + ?Sized,
    {
        let len = slots.len();
        if position >= len {
            return Err(SlotError::PositionOutOfRange { position, len });
        }

        let (last, released) = slots
            .pop()
            .ok_or(SlotError::PositionOutOfRange { position, len })?;
        self.stats.removals += 1;
        if released {
            self.stats.slots_released += 1;
        }

        if position == len - 1 {
            return Ok(Relocation {
                removed: last,
                position,
                moved: None,
            });
        }

        let removed = slots
            .get(position)
            .ok_or(SlotError::PositionOutOfRange { position, len })?;
        slots.write(position, last)?;
        index.set_position(last, position);
        self.stats.relocations += 1;

        Ok(Relocation {
            removed,
            position,
            moved: Some(last),
        })
    }

    /// Undo one [`remove`](Self::remove).
    ///
    /// Relocations must be restored in the reverse order they were produced
    /// for the table to return to its exact prior layout.
    pub fn restore<I>(
        &mut self,
        slots: &mut SelectorSlots,
        relocation: &Relocation,
        index: &mut I,
    ) -> Result<(), SlotError>
    where
        I: PositionIndex + ?Sized,
    {
        match relocation.moved {
            None => {
                let position = slots.push(relocation.removed);
                if position != relocation.position {
                    return Err(SlotError::PositionOutOfRange {
                        position: relocation.position,
                        len: position,
                    });
                }
                index.set_position(relocation.removed, position);
            }
            Some(moved) => {
                let tail = slots.push(moved);
                index.set_position(moved, tail);
                slots.write(relocation.position, relocation.removed)?;
                index.set_position(relocation.removed, relocation.position);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: u32) -> (SelectorSlots, HashMap<Selector, usize>) {
        let mut slots = SelectorSlots::new();
        let mut index = HashMap::new();
        for i in 0..n {
            let sel = Selector::from_u32(i);
            index.insert(sel, slots.push(sel));
        }
        (slots, index)
    }

    fn remove(
        compactor: &mut Compactor,
        slots: &mut SelectorSlots,
        index: &mut HashMap<Selector, usize>,
        sel: u32,
    ) -> Relocation {
        let position = index.remove(&Selector::from_u32(sel)).unwrap();
        compactor.remove(slots, position, index).unwrap()
    }

    #[test]
    fn test_remove_last_needs_no_relocation() {
        let (mut slots, mut index) = table(3);
        let mut compactor = Compactor::new();

        let r = remove(&mut compactor, &mut slots, &mut index, 2);
        assert_eq!(r.moved, None);
        assert_eq!(slots.to_vec(), vec![Selector::from_u32(0), Selector::from_u32(1)]);
        assert_eq!(compactor.stats().relocations, 0);
    }

    #[test]
    fn test_remove_moves_last_into_gap() {
        let (mut slots, mut index) = table(4);
        let mut compactor = Compactor::new();

        let r = remove(&mut compactor, &mut slots, &mut index, 1);
        assert_eq!(r.removed, Selector::from_u32(1));
        assert_eq!(r.moved, Some(Selector::from_u32(3)));
        assert_eq!(
            slots.to_vec(),
            vec![Selector::from_u32(0), Selector::from_u32(3), Selector::from_u32(2)]
        );
        assert_eq!(index[&Selector::from_u32(3)], 1);
    }

    #[test]
    fn test_two_removals_across_slots_in_one_pass() {
        // 8 + 3 layout: one removal from each slot.
        let (mut slots, mut index) = table(11);
        let mut compactor = Compactor::new();

        remove(&mut compactor, &mut slots, &mut index, 5);
        remove(&mut compactor, &mut slots, &mut index, 10);

        let got: Vec<u32> = slots.iter().map(|s| s.as_u32()).collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4, 9, 6, 7, 8]);
        for (position, sel) in slots.iter().enumerate() {
            assert_eq!(index[&sel], position);
        }
    }

    #[test]
    fn test_removals_draining_the_last_slot() {
        let (mut slots, mut index) = table(10);
        let mut compactor = Compactor::new();

        remove(&mut compactor, &mut slots, &mut index, 0);
        remove(&mut compactor, &mut slots, &mut index, 8);
        assert_eq!(slots.slot_count(), 1);
        assert_eq!(compactor.stats().slots_released, 1);

        let got: Vec<u32> = slots.iter().map(|s| s.as_u32()).collect();
        assert_eq!(got, vec![9, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_restore_is_exact_inverse() {
        let (mut slots, mut index) = table(11);
        let before_slots = slots.clone();
        let before_index = index.clone();
        let mut compactor = Compactor::new();

        let mut log = Vec::new();
        for sel in [5, 10, 0, 9] {
            log.push(remove(&mut compactor, &mut slots, &mut index, sel));
        }
        for r in log.iter().rev() {
            index.insert(r.removed, r.position);
            compactor.restore(&mut slots, r, &mut index).unwrap();
        }

        assert_eq!(slots, before_slots);
        assert_eq!(index, before_index);
    }

    #[test]
    fn test_out_of_range_position() {
        let (mut slots, mut index) = table(2);
        let mut compactor = Compactor::new();
        assert_eq!(
            compactor.remove(&mut slots, 2, &mut index),
            Err(SlotError::PositionOutOfRange { position: 2, len: 2 })
        );
        assert_eq!(slots.len(), 2);
    }
}
