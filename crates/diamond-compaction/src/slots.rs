//! Packed selector slots.
//!
//! The logical selector sequence is stored as a run of fixed-capacity
//! slots. Position `p` lives in slot `p / SLOT_CAPACITY`, cell
//! `p % SLOT_CAPACITY`. Cells past the logical end are always zero, so the
//! packed words of two equal sequences are byte-identical.

use diamond_core::{hex, Selector, SELECTOR_LEN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of selectors stored in one slot.
pub const SLOT_CAPACITY: usize = 8;

/// Size of one packed slot word in bytes.
pub const SLOT_BYTES: usize = SLOT_CAPACITY * SELECTOR_LEN;

/// Errors raised by slot table operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Position {position} out of range (length: {len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Selector count {len} does not fit {slots} slot word(s)")]
    LengthMismatch { len: usize, slots: usize },

    #[error("Unoccupied cell {cell} of slot {slot} is not zero")]
    DirtyFiller { slot: usize, cell: usize },

    #[error("Invalid slot word: {0}")]
    InvalidWord(String),
}

/// One 32-byte packed slot word, serialized as hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotWord(pub [u8; SLOT_BYTES]);

impl SlotWord {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, SlotError> {
        hex::decode_fixed::<SLOT_BYTES>(s)
            .map(SlotWord)
            .map_err(|e| SlotError::InvalidWord(e.to_string()))
    }
}

impl TryFrom<String> for SlotWord {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SlotWord::from_hex(&value)
    }
}

impl From<SlotWord> for String {
    fn from(word: SlotWord) -> Self {
        word.to_hex()
    }
}

/// A fixed-capacity group of selectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot([Selector; SLOT_CAPACITY]);

impl Slot {
    pub fn get(&self, cell: usize) -> Selector {
        self.0[cell]
    }

    fn set(&mut self, cell: usize, selector: Selector) {
        self.0[cell] = selector;
    }

    /// Pack the slot: cell `i` occupies bytes `4*i..4*i+4`, big-endian.
    pub fn to_word(&self) -> SlotWord {
        let mut word = [0u8; SLOT_BYTES];
        for (cell, selector) in self.0.iter().enumerate() {
            let offset = cell * SELECTOR_LEN;
            word[offset..offset + SELECTOR_LEN].copy_from_slice(selector.as_bytes());
        }
        SlotWord(word)
    }

    pub fn from_word(word: &SlotWord) -> Self {
        let mut slot = Slot::default();
        for (cell, chunk) in word.0.chunks_exact(SELECTOR_LEN).enumerate() {
            let mut bytes = [0u8; SELECTOR_LEN];
            bytes.copy_from_slice(chunk);
            slot.set(cell, Selector::from_bytes(bytes));
        }
        slot
    }
}

/// The logical selector sequence, packed into slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorSlots {
    slots: Vec<Slot>,
    len: usize,
}

impl SelectorSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selectors in the logical sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of physical slots currently backing the sequence.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Selector at logical position `position`.
    pub fn get(&self, position: usize) -> Option<Selector> {
        if position >= self.len {
            return None;
        }
        Some(self.slots[position / SLOT_CAPACITY].get(position % SLOT_CAPACITY))
    }

    /// Append at the logical end, opening a fresh slot when the last one is
    /// full. Returns the new selector's position.
    pub fn push(&mut self, selector: Selector) -> usize {
        let position = self.len;
        let cell = position % SLOT_CAPACITY;
        if cell == 0 {
            self.slots.push(Slot::default());
        }
        self.slots[position / SLOT_CAPACITY].set(cell, selector);
        self.len += 1;
        position
    }

    /// Overwrite an occupied position in place.
    pub(crate) fn write(&mut self, position: usize, selector: Selector) -> Result<(), SlotError> {
        if position >= self.len {
            return Err(SlotError::PositionOutOfRange {
                position,
                len: self.len,
            });
        }
        self.slots[position / SLOT_CAPACITY].set(position % SLOT_CAPACITY, selector);
        Ok(())
    }

    /// Take the final occupied cell, zeroing it. The second value is true
    /// when this emptied the last slot and it was released.
    pub fn pop(&mut self) -> Option<(Selector, bool)> {
        if self.len == 0 {
            return None;
        }
        let position = self.len - 1;
        let cell = position % SLOT_CAPACITY;
        let slot = &mut self.slots[position / SLOT_CAPACITY];
        let selector = slot.get(cell);
        slot.set(cell, Selector::ZERO);
        self.len = position;

        let released = cell == 0;
        if released {
            self.slots.pop();
        }
        Some((selector, released))
    }

    /// Iterate selectors in logical order.
    pub fn iter(&self) -> impl Iterator<Item = Selector> + '_ {
        self.slots
            .iter()
            .flat_map(|slot| slot.0.iter().copied())
            .take(self.len)
    }

    pub fn to_vec(&self) -> Vec<Selector> {
        self.iter().collect()
    }

    /// Packed words, one per slot.
    pub fn to_words(&self) -> Vec<SlotWord> {
        self.slots.iter().map(Slot::to_word).collect()
    }

    /// Rebuild from packed words holding `len` selectors.
    ///
    /// The word count must be exactly what `len` needs, and every cell past
    /// the logical end must be zero.
    pub fn from_words(words: &[SlotWord], len: usize) -> Result<Self, SlotError> {
        let needed = len.div_ceil(SLOT_CAPACITY);
        if words.len() != needed {
            return Err(SlotError::LengthMismatch {
                len,
                slots: words.len(),
            });
        }

        let slots: Vec<Slot> = words.iter().map(Slot::from_word).collect();
        for position in len..needed * SLOT_CAPACITY {
            let (slot, cell) = (position / SLOT_CAPACITY, position % SLOT_CAPACITY);
            if slots[slot].get(cell) != Selector::ZERO {
                return Err(SlotError::DirtyFiller { slot, cell });
            }
        }

        Ok(SelectorSlots { slots, len })
    }
}

impl FromIterator<Selector> for SelectorSlots {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        let mut slots = SelectorSlots::new();
        for selector in iter {
            slots.push(selector);
        }
        slots
    }
}
