//! Store configuration.

use serde::{Deserialize, Serialize};

/// Configuration shared by the engine and every store node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Emit log entries for registration, dispatch and stream lifecycle.
    #[serde(default)]
    pub debug: bool,
    /// Reserved. Carried and logged, but not used by the engine.
    #[serde(default)]
    pub cache: bool,
}

impl StoreConfig {
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn is_cache(&self) -> bool {
        self.cache
    }
}

/// Builder for store configuration.
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
        }
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.config.cache = enabled;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
