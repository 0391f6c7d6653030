//! # diamond-registry
//!
//! The selector-routing registry at the heart of a diamond.
//!
//! This crate provides:
//! - Routing state: selector → facet, facet → selectors, and the dense
//!   selector sequence backing O(1) removal
//! - Cuts: ordered batches of Add / Replace / Remove applied all-or-nothing,
//!   with an undo log replayed on any failure
//! - Post-cut hook: one initializer call after mutation, whose failure
//!   reverts the whole batch
//! - Loupe: point lookups and full enumeration of facets
//! - Snapshots: the routing table persisted in the compact slot layout
//!
//! ## Example
//!
//! ```rust
//! use diamond_core::{Address, FacetCut, Selector};
//! use diamond_registry::{Registry, RegistryConfig};
//!
//! let cut_facet = Address::from_low_u64(1);
//! let test_facet = Address::from_low_u64(2);
//!
//! let mut registry = Registry::with_cuts(
//!     RegistryConfig::default(),
//!     &[FacetCut::add(cut_facet, [Selector::from_u32(0x1f93_1c1c)])],
//! )
//! .unwrap();
//!
//! registry
//!     .apply(&[FacetCut::add(test_facet, [Selector::from_u32(0x19e3_b533)])])
//!     .unwrap();
//!
//! assert_eq!(
//!     registry.facet_address(&Selector::from_u32(0x19e3_b533)),
//!     Some(test_facet)
//! );
//! assert_eq!(registry.facet_addresses(), vec![cut_facet, test_facet]);
//! ```

pub mod config;
pub mod cut;
pub mod error;
mod loupe;
pub mod registry;
pub mod snapshot;
mod undo;
pub mod verify;

pub use config::RegistryConfig;
pub use cut::{CutId, CutReceipt, NoHook, PostCutHook};
pub use error::{CutError, RegistryError, Result};
pub use registry::Registry;
pub use snapshot::{RegistrySnapshot, SNAPSHOT_VERSION};
pub use verify::InvariantViolation;
