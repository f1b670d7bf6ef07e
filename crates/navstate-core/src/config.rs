use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tuning for the URL parser/builder.
///
/// Every field has a default, so a TOML file only needs to name what it
/// changes.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Query parameter that carries the state token.
    pub token_param: String,
    /// Serialized states longer than this are stored in the link cache.
    pub max_state_length: usize,
    /// Same threshold, applied to resource requests.
    pub max_state_length_resource: usize,
    /// Resume the last state of an originator when a request carries no token.
    pub state_cache_enabled: bool,
    pub shared: SharedResourceConfig,
    pub caches: CacheConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            token_param: "p".to_string(),
            max_state_length: 50,
            max_state_length_resource: 50,
            state_cache_enabled: false,
            shared: SharedResourceConfig::default(),
            caches: CacheConfig::default(),
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values that would make URLs unparseable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_param.is_empty() {
            return Err(ConfigError::Invalid("token_param must not be empty".to_string()));
        }
        let segment = &self.shared.segment;
        if segment.is_empty() || segment.contains(['/', '?', '&']) {
            return Err(ConfigError::Invalid(format!(
                "shared.segment {segment:?} must be a single non-empty path segment"
            )));
        }
        Ok(())
    }

    /// Threshold for the given request kind.
    pub fn max_inline_length(&self, resource_request: bool) -> usize {
        if resource_request {
            self.max_state_length_resource
        } else {
            self.max_state_length
        }
    }
}

/// Rewriting of static resource URLs into a session-independent form.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SharedResourceConfig {
    pub enabled: bool,
    /// Path segment after the context path, and the canonical window id of
    /// shared states.
    pub segment: String,
    /// Resource-window parameter naming the library.
    pub library_param: String,
    /// Resource-window parameter naming the resource inside the library.
    pub resource_param: String,
    /// Regular expressions; a library is shared if one matches its whole name.
    pub library_patterns: Vec<String>,
}

impl Default for SharedResourceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            segment: "shared".to_string(),
            library_param: "ln".to_string(),
            resource_param: "javax.faces.resource".to_string(),
            library_patterns: Vec::new(),
        }
    }
}

/// Bounds for one store.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub capacity: usize,
    /// Zero disables time-based expiry.
    pub ttl_secs: u64,
}

impl StoreConfig {
    pub const fn new(capacity: usize, ttl_secs: u64) -> Self {
        Self { capacity, ttl_secs }
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(10_000, 3_600)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub link: StoreConfig,
    pub reverse_link: StoreConfig,
    pub state: StoreConfig,
    /// The shared-resource reverse table.
    pub shared: StoreConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            link: StoreConfig::new(50_000, 4 * 3_600),
            reverse_link: StoreConfig::new(50_000, 4 * 3_600),
            state: StoreConfig::new(10_000, 1_800),
            shared: StoreConfig::new(10_000, 24 * 3_600),
        }
    }
}
