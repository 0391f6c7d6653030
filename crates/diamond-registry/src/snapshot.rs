//! Registry persistence in the compact slot layout.
//!
//! A snapshot stores the dense selector sequence as packed 32-byte slot
//! words alongside the facet grouping. Loading rebuilds the routing maps,
//! checks every invariant and compares the recomputed state root.

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::registry::{Registry, SelectorEntry};
use diamond_compaction::{SelectorSlots, SlotWord};
use diamond_core::{Facet, Hash, Hasher};
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

const STATE_ROOT_DOMAIN: &[u8] = b"diamond-registry/state/v1";

/// A persisted registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    /// Format version for compatibility.
    pub version: u8,

    /// Registry generation at the time of the snapshot.
    pub generation: u64,

    /// Number of selectors in the dense sequence.
    pub selector_count: usize,

    /// The dense sequence, eight selectors per word.
    pub slots: Vec<SlotWord>,

    /// Facets in enumeration order, each with its selectors.
    pub facets: Vec<Facet>,

    /// Digest of the state above.
    pub state_root: Hash,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Registry {
    /// Digest of the routing state: facet order, per-facet selector order
    /// and the packed slot words.
    pub fn state_root(&self) -> Hash {
        let mut hasher = Hasher::new();
        hasher.update(STATE_ROOT_DOMAIN);
        hasher.update(&(self.facet_order.len() as u64).to_be_bytes());
        for facet in &self.facet_order {
            let selectors = self.facets.get(facet).map(Vec::as_slice).unwrap_or(&[]);
            hasher.update(facet.as_bytes());
            hasher.update(&(selectors.len() as u64).to_be_bytes());
            for selector in selectors {
                hasher.update(selector.as_bytes());
            }
        }
        hasher.update(&(self.slots.len() as u64).to_be_bytes());
        for word in self.slots.to_words() {
            hasher.update(&word.0);
        }
        hasher.finalize()
    }

    /// Capture the committed state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            generation: self.generation,
            selector_count: self.slots.len(),
            slots: self.slots.to_words(),
            facets: self.facets(),
            state_root: self.state_root(),
        }
    }

    /// Rebuild a registry from a snapshot, rejecting anything inconsistent.
    pub fn from_snapshot(
        config: RegistryConfig,
        snapshot: &RegistrySnapshot,
    ) -> Result<Self, RegistryError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RegistryError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                actual: snapshot.version,
            });
        }

        let slots = SelectorSlots::from_words(&snapshot.slots, snapshot.selector_count)
            .map_err(|e| RegistryError::CorruptSnapshot(e.to_string()))?;

        let mut registry = Registry::new(config);
        registry.generation = snapshot.generation;

        for facet in &snapshot.facets {
            if registry.facets.contains_key(&facet.facet_address) {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "facet {} listed twice",
                    facet.facet_address
                )));
            }
            for selector in &facet.function_selectors {
                let entry = SelectorEntry {
                    facet: facet.facet_address,
                    position: usize::MAX,
                };
                if registry.selectors.0.insert(*selector, entry).is_some() {
                    return Err(RegistryError::CorruptSnapshot(format!(
                        "selector {} owned twice",
                        selector
                    )));
                }
            }
            registry
                .facets
                .insert(facet.facet_address, facet.function_selectors.clone());
            registry.facet_order.push(facet.facet_address);
        }

        for (position, selector) in slots.iter().enumerate() {
            let entry = registry.selectors.0.get_mut(&selector).ok_or_else(|| {
                RegistryError::CorruptSnapshot(format!("selector {} has no facet", selector))
            })?;
            entry.position = position;
        }
        registry.slots = slots;

        registry
            .verify()
            .map_err(|e| RegistryError::CorruptSnapshot(e.to_string()))?;

        let root = registry.state_root();
        if root != snapshot.state_root {
            return Err(RegistryError::CorruptSnapshot(format!(
                "state root mismatch: expected {}, computed {}",
                snapshot.state_root.short(),
                root.short()
            )));
        }

        tracing::info!(
            generation = registry.generation,
            selectors = registry.selector_count(),
            facets = registry.facet_count(),
            "registry restored from snapshot"
        );
        Ok(registry)
    }
}
