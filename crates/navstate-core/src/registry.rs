use core::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use crossbeam_epoch::{self as epoch, Atomic, Owned};
use navstate_dsa::ExpiringStore;
use regex::RegexSet;

use crate::config::{SharedResourceConfig, StoreConfig};
use crate::error::{ConfigError, PortalError};
use crate::state::NavigationalState;

/// Compiled set of library-name patterns. Each pattern must match the whole
/// library name.
#[derive(Debug, Clone)]
pub struct LibraryMatcher {
    patterns: Vec<String>,
    set: RegexSet,
}

impl LibraryMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let set = RegexSet::new(patterns.iter().map(|p| format!("^(?:{p})$")))?;
        Ok(Self { patterns, set })
    }

    pub fn is_match(&self, library: &str) -> bool {
        self.set.is_match(library)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// A state rewritten into shared form, plus its serialized bytes.
#[derive(Debug, Clone)]
pub struct SharedForm {
    pub state: NavigationalState,
    pub encoded: Bytes,
}

/// Decides which resource URLs are shared across sessions and remembers the
/// owning state of every shared form it hands out.
///
/// ## Shadow-Swap
/// The library matcher sits behind an epoch-managed atomic pointer, so
/// patterns can be replaced while other threads are deciding without either
/// side taking a lock.
///
/// ## Retention
/// The reverse table is a bounded [`ExpiringStore`]. An evicted entry makes
/// its shared URL unresolvable until a page that references it is rendered
/// again; unbounded retention would trade that for unbounded memory growth.
pub struct SharedResourceRegistry {
    settings: SharedResourceConfig,
    matcher: Atomic<LibraryMatcher>,
    table: ExpiringStore<Bytes, Arc<NavigationalState>>,
}

impl SharedResourceRegistry {
    pub fn new(settings: &SharedResourceConfig, table: StoreConfig) -> Result<Self, ConfigError> {
        let matcher = LibraryMatcher::new(&settings.library_patterns)?;
        Ok(Self {
            settings: settings.clone(),
            matcher: Atomic::new(matcher),
            table: ExpiringStore::new("sharedResourceTable", table.capacity, table.ttl()),
        })
    }

    /// Path segment and canonical window id of shared states.
    pub fn segment(&self) -> &str {
        &self.settings.segment
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Replaces the library patterns. Decisions already in flight finish
    /// against the old set.
    pub fn swap_patterns<I, S>(&self, patterns: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let new_matcher = LibraryMatcher::new(patterns)?;
        let count = new_matcher.patterns().len();
        let guard = epoch::pin();

        // # Safety: The old matcher is destroyed only after every thread that
        // could have loaded it has unpinned its epoch.
        let old = self.matcher.swap(Owned::new(new_matcher), Ordering::AcqRel, &guard);
        unsafe {
            if !old.is_null() {
                guard.defer_destroy(old);
            }
        }
        tracing::info!("SharedResourceRegistry: swapped in {} library patterns", count);
        Ok(())
    }

    pub fn patterns(&self) -> Vec<String> {
        let guard = epoch::pin();
        let shared = self.matcher.load(Ordering::Acquire, &guard);
        // # Safety: `guard` pins the epoch until the patterns are copied out,
        // so a concurrent swap cannot free the matcher under this read.
        unsafe { shared.as_ref() }
            .map(|m| m.patterns().to_vec())
            .unwrap_or_default()
    }

    fn library_matches(&self, library: &str) -> bool {
        let guard = epoch::pin();
        let shared = self.matcher.load(Ordering::Acquire, &guard);
        // # Safety: `guard` keeps the matcher alive across a concurrent swap.
        unsafe { shared.as_ref() }.is_some_and(|m| m.is_match(library))
    }

    /// True when `state` is a resource request, not already shared, and its
    /// resource window names a resource of a matching library.
    pub fn qualifies(&self, state: &NavigationalState) -> bool {
        if !self.settings.enabled {
            return false;
        }
        let Some(window) = state.resource_window() else {
            return false;
        };
        if window == self.settings.segment {
            return false;
        }
        if state.parameter(window, &self.settings.resource_param).is_none() {
            return false;
        }
        state
            .parameter(window, &self.settings.library_param)
            .and_then(|p| p.first_value())
            .is_some_and(|library| self.library_matches(library))
    }

    /// Clones `state` into shared form and records the clone's bytes as the
    /// reverse key of `state`.
    pub fn share(&self, state: &NavigationalState) -> SharedForm {
        let mut shared = state.clone();
        shared.convert_to_shared_resource(&self.settings.segment);
        let encoded = Bytes::from(shared.encode());
        self.table.put(encoded.clone(), Arc::new(state.clone()));
        tracing::debug!(
            "{}: recorded shared form for resource window {:?}",
            state.origin_id(),
            state.resource_window()
        );
        SharedForm {
            state: shared,
            encoded,
        }
    }

    /// Finds the owning state of a decoded shared state.
    pub fn resolve(&self, shared: &NavigationalState) -> Result<NavigationalState, PortalError> {
        let key = Bytes::from(shared.encode());
        match self.table.get(&key) {
            Some(owner) => Ok((*owner).clone()),
            None => Err(PortalError::ReverseMap {
                key: String::from_utf8_lossy(&key).into_owned(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&self) {
        self.table.clear();
    }
}

impl Drop for SharedResourceRegistry {
    fn drop(&mut self) {
        let guard = epoch::pin();
        // # Safety: `&mut self` means no reader holds this matcher any more;
        // destruction is still deferred to respect the epoch protocol.
        let old = self.matcher.swap(epoch::Shared::null(), Ordering::AcqRel, &guard);
        unsafe {
            if !old.is_null() {
                guard.defer_destroy(old);
            }
        }
    }
}
