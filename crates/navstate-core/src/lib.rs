pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;
pub mod state;
pub mod window;
mod wire;

pub use cache::{CorrelationCaches, LinkKey};
pub use config::{CacheConfig, ParserConfig, SharedResourceConfig, StoreConfig};
pub use error::{ConfigError, PortalError};
pub use registry::{LibraryMatcher, SharedForm, SharedResourceRegistry};
pub use session::{RequestBinding, UrlRenderer, NO_SESSION};
pub use state::{NavigationalState, ParameterMap, Values};
pub use window::{Parameter, ParameterKey, PortletMode, WindowState};

/// A unified builder for portal URL parsers.
///
/// Collects configuration fluently; the transport layer turns it into a
/// running parser with `PortalUrlParser::from_builder`.
#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    pub config: ParserConfig,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the whole configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares resources of libraries whose whole name matches `pattern`.
    /// Also switches shared rewriting on.
    pub fn share_library(mut self, pattern: &str) -> Self {
        self.config.shared.enabled = true;
        self.config.shared.library_patterns.push(pattern.to_string());
        self
    }

    pub fn with_shared_resources(mut self, enabled: bool) -> Self {
        self.config.shared.enabled = enabled;
        self
    }

    pub fn with_state_cache(mut self, enabled: bool) -> Self {
        self.config.state_cache_enabled = enabled;
        self
    }

    /// Inline-vs-cached thresholds for ordinary and resource requests.
    pub fn with_thresholds(mut self, normal: usize, resource: usize) -> Self {
        self.config.max_state_length = normal;
        self.config.max_state_length_resource = resource;
        self
    }
}
