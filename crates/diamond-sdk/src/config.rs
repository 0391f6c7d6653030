//! Configuration for a [`Diamond`](crate::Diamond).

use diamond_core::Address;
use diamond_registry::RegistryConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a diamond.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiamondConfig {
    /// Initial owner. The null address leaves the diamond ownerless, so no
    /// caller passes the ownership check.
    pub owner: Address,
    /// Settings for the underlying registry.
    pub registry: RegistryConfig,
    /// Register the standard interface ids (ERC-165, cut, loupe, ERC-173)
    /// at construction.
    pub default_interfaces: bool,
}

impl Default for DiamondConfig {
    fn default() -> Self {
        Self {
            owner: Address::ZERO,
            registry: RegistryConfig::default(),
            default_interfaces: true,
        }
    }
}

/// Builder for diamond configuration.
pub struct DiamondConfigBuilder {
    config: DiamondConfig,
}

impl DiamondConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DiamondConfig::default(),
        }
    }

    pub fn owner(mut self, owner: Address) -> Self {
        self.config.owner = owner;
        self
    }

    pub fn registry(mut self, registry: RegistryConfig) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn verify_after_cut(mut self, enabled: bool) -> Self {
        self.config.registry.verify_after_cut = enabled;
        self
    }

    pub fn max_cut_size(mut self, limit: usize) -> Self {
        self.config.registry.max_cut_size = Some(limit);
        self
    }

    pub fn default_interfaces(mut self, enabled: bool) -> Self {
        self.config.default_interfaces = enabled;
        self
    }

    pub fn build(self) -> DiamondConfig {
        self.config
    }
}

impl Default for DiamondConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let owner = Address::from_low_u64(7);
        let config = DiamondConfigBuilder::new()
            .owner(owner)
            .verify_after_cut(true)
            .max_cut_size(64)
            .default_interfaces(false)
            .build();

        assert_eq!(config.owner, owner);
        assert!(config.registry.verify_after_cut);
        assert_eq!(config.registry.max_cut_size, Some(64));
        assert!(!config.default_interfaces);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: DiamondConfig = serde_json::from_str(
            r#"{ "owner": "0x00000000000000000000000000000000000000aa" }"#,
        )
        .unwrap();

        assert_eq!(config.owner, Address::from_low_u64(0xaa));
        assert!(config.default_interfaces);
        assert_eq!(config.registry, RegistryConfig::default());
    }
}
