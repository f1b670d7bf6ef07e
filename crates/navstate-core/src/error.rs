use navstate_codec::CodecError;
use navstate_crypto::CryptoError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid shared-library pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Malformed or truncated state bytes.
    #[error("framing error: {0}")]
    Codec(#[from] CodecError),

    /// Token did not decrypt. Callers treat this as a cache miss.
    #[error("decryption failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A shared-resource token no longer maps to an owning state.
    #[error("shared resource token {key} has no owning state")]
    ReverseMap { key: String },

    /// Building an outbound token failed.
    #[error("encoding failure: {0}")]
    Encoding(String),
}
