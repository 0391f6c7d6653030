//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Check every invariant before committing a cut, rolling back on
    /// violation. Defaults to on in debug builds.
    #[serde(default = "default_verify_after_cut")]
    pub verify_after_cut: bool,

    /// Upper bound on the total number of selectors one cut may name.
    #[serde(default)]
    pub max_cut_size: Option<usize>,
}

fn default_verify_after_cut() -> bool {
    cfg!(debug_assertions)
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            verify_after_cut: default_verify_after_cut(),
            max_cut_size: None,
        }
    }
}
