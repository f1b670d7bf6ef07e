use base64::Engine as _;
use bytes::Bytes;
use navstate_dsa::{ExpiringStore, StoreStats};

use crate::config::CacheConfig;

/// Outcome of storing a payload in the link cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkKey {
    pub key: String,
    /// True when an identical payload already owned this key.
    pub reused: bool,
}

/// The three correlation stores behind large and resumable states.
///
/// - link: random key -> serialized state, for states too large to inline.
/// - reverse link: base64 of a serialized state -> its link key, so equal
///   states share one key.
/// - state: originator id -> last serialized state of that originator.
pub struct CorrelationCaches {
    link: ExpiringStore<String, Bytes>,
    reverse_link: ExpiringStore<String, String>,
    state: ExpiringStore<String, Bytes>,
}

impl CorrelationCaches {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            link: ExpiringStore::new("linkCache", config.link.capacity, config.link.ttl()),
            reverse_link: ExpiringStore::new(
                "reverseLinkCache",
                config.reverse_link.capacity,
                config.reverse_link.ttl(),
            ),
            state: ExpiringStore::new("stateCache", config.state.capacity, config.state.ttl()),
        }
    }

    pub fn resolve_link(&self, key: &str) -> Option<Bytes> {
        self.link.get(key)
    }

    /// Stores `payload` under a link key, reusing the key of an identical
    /// payload when one is known.
    ///
    /// A reused key whose link entry was evicted in the meantime is filled
    /// again, so a returned key always resolves right after this call.
    pub fn store_link(&self, payload: Bytes) -> LinkKey {
        let fingerprint = base64::engine::general_purpose::STANDARD.encode(&payload);

        if let Some(key) = self.reverse_link.get(&fingerprint) {
            if !self.link.contains(&key) {
                self.link.put(key.clone(), payload);
            }
            return LinkKey { key, reused: true };
        }

        let key = loop {
            let candidate = format!("{:016X}", rand::random::<u64>());
            if !self.link.contains(&candidate) {
                break candidate;
            }
        };
        self.link.put(key.clone(), payload);
        self.reverse_link.put(fingerprint, key.clone());
        LinkKey { key, reused: false }
    }

    pub fn resume_state(&self, origin_id: &str) -> Option<Bytes> {
        self.state.get(origin_id)
    }

    pub fn remember_state(&self, origin_id: &str, payload: Bytes) {
        self.state.put(origin_id.to_string(), payload);
    }

    /// Drops the originator's entry, e.g. after it failed to decode.
    pub fn forget_state(&self, origin_id: &str) {
        self.state.remove(origin_id);
    }

    pub fn clear(&self) {
        self.link.clear();
        self.reverse_link.clear();
        self.state.clear();
    }

    pub fn link_len(&self) -> usize {
        self.link.len()
    }

    pub fn state_len(&self) -> usize {
        self.state.len()
    }

    /// Counters of the link, reverse-link and state stores, in that order.
    pub fn stats(&self) -> [(&'static str, StoreStats); 3] {
        [
            (self.link.name(), self.link.stats()),
            (self.reverse_link.name(), self.reverse_link.stats()),
            (self.state.name(), self.state.stats()),
        ]
    }
}
