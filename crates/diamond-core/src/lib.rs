//! # diamond-core
//!
//! Shared data model for the diamond selector-routing registry.
//!
//! A diamond delegates every incoming call, identified by a fixed-width
//! [`Selector`], to one of several swappable handler modules ("facets"),
//! each named by an [`Address`]. Mutations arrive as batches of
//! [`FacetCut`]s, and the loupe surface reports ownership as [`Facet`] rows.

pub mod address;
pub mod cut;
pub mod error;
pub mod hash;
pub mod hex;
pub mod selector;

pub use address::{Address, ADDRESS_LEN};
pub use cut::{Facet, FacetCut, FacetCutAction};
pub use error::{CoreError, Result};
pub use hash::{Hash, Hasher};
pub use selector::{Selector, SELECTOR_LEN};
