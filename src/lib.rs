//! # navstate: Portal Navigational State in URLs
//!
//! Re-exports the workspace crates behind one dependency:
//!
//! - [`codec`]: the length-prefixed compact text codec.
//! - [`store`]: bounded, expiring concurrent stores.
//! - [`crypto`]: inline token sealing.
//! - [`core`]: the navigational state, its caches and configuration.
//! - [`transport`]: request parsing and URL building.

pub use navstate_codec as codec;
pub use navstate_core as core;
pub use navstate_crypto as crypto;
pub use navstate_dsa as store;
pub use navstate_transport as transport;

pub use navstate_core::{NavigationalState, ParserBuilder, ParserConfig, PortalError};
pub use navstate_crypto::{ChaChaTokenCipher, TokenCipher};
pub use navstate_transport::{InboundRequest, PortalUrlParser};
