//! Diamond SDK - embedding surface for the selector routing registry
//!
//! This crate provides:
//!
//! - [`Diamond`]: a shareable handle that gates cuts behind an
//!   [`Authorizer`], routes selectors to facets and answers loupe queries
//! - [`Ownership`]: the single-owner authorizer with transfer support
//! - [`InterfaceTable`]: ERC-165 style interface support flags
//! - [`DiamondConfig`] and [`DiamondConfigBuilder`]
//!
//! # Quick Start
//!
//! ```rust
//! use diamond_core::{Address, FacetCut, Selector};
//! use diamond_sdk::{Diamond, DiamondConfigBuilder};
//!
//! let owner = Address::from_low_u64(1);
//! let cut_facet = Address::from_low_u64(0xc0);
//! let loupe_facet = Address::from_low_u64(0x10);
//!
//! let diamond = Diamond::with_facets(
//!     DiamondConfigBuilder::new().owner(owner).build(),
//!     &[
//!         FacetCut::add(cut_facet, [Selector::from_u32(0x1f931c1c)]),
//!         FacetCut::add(loupe_facet, [Selector::from_u32(0x7a0ed627)]),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(diamond.facet_addresses(), vec![cut_facet, loupe_facet]);
//! assert!(diamond.supports_interface(&diamond_sdk::interfaces::ERC165));
//! ```

pub mod config;
pub mod diamond;
pub mod error;
pub mod interfaces;
pub mod ownership;

pub use config::{DiamondConfig, DiamondConfigBuilder};
pub use diamond::Diamond;
pub use error::{DiamondError, Result};
pub use interfaces::{InterfaceId, InterfaceTable};
pub use ownership::{AllowAll, Authorizer, Ownership};

// Re-export commonly used types from the lower layers
pub use diamond_core::{Address, Facet, FacetCut, FacetCutAction, Selector};
pub use diamond_registry::{CutError, CutReceipt, PostCutHook, RegistryConfig, RegistrySnapshot};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{DiamondConfig, DiamondConfigBuilder};
    pub use crate::diamond::Diamond;
    pub use crate::error::DiamondError;
    pub use crate::ownership::{AllowAll, Authorizer, Ownership};
    pub use diamond_core::{Address, Facet, FacetCut, Selector};
}
