//! Loupe: read-only introspection over the committed routing state.

use crate::registry::Registry;
use diamond_core::{Address, Facet, Selector};

impl Registry {
    /// The facet that owns `selector`, if any.
    pub fn facet_address(&self, selector: &Selector) -> Option<Address> {
        self.selectors.0.get(selector).map(|entry| entry.facet)
    }

    /// Selectors owned by `facet`, in the order they were attached. Empty
    /// for an unknown facet.
    pub fn facet_function_selectors(&self, facet: &Address) -> Vec<Selector> {
        self.facets.get(facet).cloned().unwrap_or_default()
    }

    /// Known facets, in the order each first gained a selector.
    pub fn facet_addresses(&self) -> Vec<Address> {
        self.facet_order.clone()
    }

    /// Every known facet with its selectors, in [`facet_addresses`] order.
    ///
    /// [`facet_addresses`]: Registry::facet_addresses
    pub fn facets(&self) -> Vec<Facet> {
        self.facet_order
            .iter()
            .map(|facet| Facet {
                facet_address: *facet,
                function_selectors: self.facet_function_selectors(facet),
            })
            .collect()
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.selectors.0.contains_key(selector)
    }

    /// Logical position of `selector` in the dense sequence.
    pub fn position_of(&self, selector: &Selector) -> Option<usize> {
        self.selectors.0.get(selector).map(|entry| entry.position)
    }

    /// All selectors in dense-sequence order.
    pub fn selectors(&self) -> Vec<Selector> {
        self.slots.to_vec()
    }

    pub fn selector_count(&self) -> usize {
        self.slots.len()
    }

    pub fn facet_count(&self) -> usize {
        self.facet_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
