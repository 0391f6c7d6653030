//! # diamond-compaction
//!
//! Dense storage and compaction for the diamond registry's selector
//! sequence.
//!
//! This crate provides:
//! - Packed slots: the logical selector sequence stored eight selectors to a
//!   32-byte slot word
//! - Swap-and-shrink removal: the last selector fills the gap left by a
//!   removed one, keeping the sequence gap-free
//! - Exact inverse of a removal, so a failed batch can be rolled back
//!
//! ## Last-slot discipline
//!
//! Every removal reads the final occupied cell straight from the slot table
//! and writes the relocated selector back into the table before returning.
//! Nothing about the last slot is buffered between removals, so two
//! removals that land in the same physical slot within one batch can
//! neither resurrect a removed selector nor drop a relocated one.
//!
//! ## Example
//!
//! ```rust
//! use diamond_compaction::{Compactor, PositionIndex, SelectorSlots};
//! use diamond_core::Selector;
//! use std::collections::HashMap;
//!
//! let mut slots = SelectorSlots::new();
//! let mut positions: HashMap<Selector, usize> = HashMap::new();
//! for i in 0..11u32 {
//!     let sel = Selector::from_u32(i);
//!     positions.insert(sel, slots.push(sel));
//! }
//!
//! let mut compactor = Compactor::new();
//! for sel in [Selector::from_u32(5), Selector::from_u32(10)] {
//!     let position = positions.remove(&sel).unwrap();
//!     compactor.remove(&mut slots, position, &mut positions).unwrap();
//! }
//!
//! assert_eq!(slots.len(), 9);
//! assert!(!slots.iter().any(|s| s == Selector::from_u32(5)));
//! ```

mod compactor;
mod slots;

pub use compactor::{CompactionStats, Compactor, PositionIndex, Relocation};
pub use slots::{Slot, SelectorSlots, SlotError, SlotWord, SLOT_BYTES, SLOT_CAPACITY};
