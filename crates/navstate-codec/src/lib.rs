//! # navstate-codec: Compact Length-Prefixed Framing
//!
//! Encodes optional strings, arrays of optional strings and string-keyed maps
//! into a flat text stream. Absence is always distinguishable from emptiness.
//! The decoder trusts well-formed input; the only failures are running out of
//! input or hitting a malformed length.

pub mod compact;
pub mod map;

pub use compact::{Reader, Writer, ABSENT};
pub use map::ElementCodec;

/// Framing failure while decoding. Local to one decode attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("end of input: needed {expected} chars, {available} available")]
    Truncated { expected: usize, available: usize },

    #[error("malformed length prefix: {0:?}")]
    InvalidLength(String),

    #[error("required {0} was encoded as absent")]
    UnexpectedNull(&'static str),

    #[error("encoded state is not valid UTF-8")]
    InvalidUtf8,
}
