//! # navstate-transport: Portal URL Parsing and Building
//!
//! The request-facing half of the codec. [`PortalUrlParser`] reads the token
//! of an [`InboundRequest`] (query parameter or shared-resource path
//! segment), resolves it through the link cache or the token cipher, and
//! renders states back into URLs.

pub mod parser;
pub mod query;
pub mod request;

pub use parser::PortalUrlParser;
pub use request::InboundRequest;
