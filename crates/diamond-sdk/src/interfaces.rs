//! ERC-165 style interface support table.

use diamond_core::Selector;
use std::collections::BTreeSet;

/// Interface identifiers share the 4-byte selector representation.
pub type InterfaceId = Selector;

/// ERC-165 `supportsInterface(bytes4)`.
pub const ERC165: InterfaceId = Selector::from_u32(0x01ff_c9a7);
/// Diamond cut.
pub const DIAMOND_CUT: InterfaceId = Selector::from_u32(0x1f93_1c1c);
/// Diamond loupe.
pub const DIAMOND_LOUPE: InterfaceId = Selector::from_u32(0x48e2_b093);
/// ERC-173 ownership.
pub const ERC173: InterfaceId = Selector::from_u32(0x7f58_28d0);
/// Never supported.
pub const INVALID: InterfaceId = Selector::from_u32(0xffff_ffff);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceTable {
    supported: BTreeSet<InterfaceId>,
}

impl InterfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the four standard interfaces registered.
    pub fn with_defaults() -> Self {
        Self {
            supported: [ERC165, DIAMOND_CUT, DIAMOND_LOUPE, ERC173]
                .into_iter()
                .collect(),
        }
    }

    pub fn supports(&self, id: &InterfaceId) -> bool {
        *id != INVALID && self.supported.contains(id)
    }

    /// Mark `id` as supported or not. Returns the previous setting.
    pub fn set(&mut self, id: InterfaceId, supported: bool) -> bool {
        if supported {
            !self.supported.insert(id)
        } else {
            self.supported.remove(&id)
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &InterfaceId> {
        self.supported.iter()
    }
}
