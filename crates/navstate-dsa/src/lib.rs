//! # navstate-dsa: Bounded Correlation Stores
//!
//! Concurrent key/value storage with LRU capacity bounds and optional TTL.
//! Every cache in the navigational-state pipeline is one of these.

pub mod store;

pub use store::{ExpiringStore, StoreStats};
