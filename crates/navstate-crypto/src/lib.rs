//! # navstate-crypto: Inline Token Encryption
//!
//! Small navigational states travel inside the URL. They are sealed with
//! ChaCha20-Poly1305 under a random nonce and carried as
//! `base64(nonce || ciphertext || tag)`.

use base64::Engine as _;
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce, Tag};
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Associated data bound into every token so sealed states cannot be
/// replayed into another protocol sharing the key.
const TOKEN_AAD: &[u8] = b"navstate-token/v1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("token is not a sealed payload: {0}")]
    Malformed(String),

    #[error("token failed the integrity check")]
    IntegrityCheckFailed,

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

/// The symmetric encryption collaborator of the URL codec.
///
/// `decrypt` failing is an expected outcome (stale keys, foreign tokens,
/// tampering) and callers treat it like a cache miss.
pub trait TokenCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError>;

    fn decrypt(&self, token: &str) -> Result<Vec<u8>, CryptoError>;
}

/// ChaCha20-Poly1305 token cipher with a zeroized in-memory key.
///
/// The whole token is one buffer: the nonce prefix stays in clear, the
/// middle is transformed in place, and the detached tag is appended. No
/// second allocation is made for the ciphertext.
pub struct ChaChaTokenCipher {
    key: Zeroizing<[u8; 32]>,
}

impl ChaChaTokenCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Creates a cipher with a fresh random key. Tokens do not survive a
    /// restart with such a key.
    pub fn generate() -> Self {
        Self::new(rand::random::<[u8; 32]>())
    }

    /// Loads a key from its standard base64 form.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let raw = Zeroizing::new(
            base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?,
        );
        let key: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKey(format!("expected 32 bytes, got {}", raw.len())))?;
        Ok(Self::new(key))
    }

    #[inline]
    fn aead(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key[..]))
    }
}

impl core::fmt::Debug for ChaChaTokenCipher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChaChaTokenCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl TokenCipher for ChaChaTokenCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let nonce = rand::random::<[u8; NONCE_LEN]>();
        let mut token = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(plaintext);

        let tag = self
            .aead()
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), TOKEN_AAD, &mut token[NONCE_LEN..])
            .map_err(|_| CryptoError::IntegrityCheckFailed)?;
        token.extend_from_slice(&tag);

        Ok(base64::engine::general_purpose::STANDARD.encode(&token))
    }

    fn decrypt(&self, token: &str) -> Result<Vec<u8>, CryptoError> {
        let mut sealed = base64::engine::general_purpose::STANDARD
            .decode(token)
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Malformed(format!(
                "{} bytes is shorter than nonce and tag",
                sealed.len()
            )));
        }

        let tag_at = sealed.len() - TAG_LEN;
        let tag = Tag::clone_from_slice(&sealed[tag_at..]);
        let (nonce, body) = sealed[..tag_at].split_at_mut(NONCE_LEN);
        self.aead()
            .decrypt_in_place_detached(Nonce::from_slice(nonce), TOKEN_AAD, body, &tag)
            .map_err(|_| CryptoError::IntegrityCheckFailed)?;

        sealed.truncate(tag_at);
        sealed.drain(..NONCE_LEN);
        Ok(sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_token_opens_with_same_key() {
        let cipher = ChaChaTokenCipher::new(*b"an example very very secret key.");
        let token = cipher.encrypt(b"0105/page").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap(), b"0105/page");
    }

    #[test]
    fn nonces_make_tokens_unique() {
        let cipher = ChaChaTokenCipher::generate();
        assert_ne!(cipher.encrypt(b"same").unwrap(), cipher.encrypt(b"same").unwrap());
    }

    #[test]
    fn foreign_key_fails_integrity() {
        let a = ChaChaTokenCipher::new([1; 32]);
        let b = ChaChaTokenCipher::new([2; 32]);
        let token = a.encrypt(b"payload").unwrap();
        assert_eq!(b.decrypt(&token), Err(CryptoError::IntegrityCheckFailed));
    }

    #[test]
    fn short_or_garbage_tokens_are_malformed() {
        let cipher = ChaChaTokenCipher::generate();
        assert!(matches!(cipher.decrypt("AAAA"), Err(CryptoError::Malformed(_))));
        assert!(matches!(cipher.decrypt("not base64!"), Err(CryptoError::Malformed(_))));
    }

    #[test]
    fn key_loads_from_base64() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        let cipher = ChaChaTokenCipher::from_base64(&encoded).unwrap();
        let token = ChaChaTokenCipher::new([7; 32]).encrypt(b"x").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap(), b"x");

        assert!(matches!(
            ChaChaTokenCipher::from_base64("AAAA"),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn flipped_ciphertext_bit_fails_integrity() {
        let cipher = ChaChaTokenCipher::new([3; 32]);
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(cipher.encrypt(b"0105/page").unwrap())
            .unwrap();
        raw[NONCE_LEN] ^= 0x01;
        let tampered = base64::engine::general_purpose::STANDARD.encode(raw);
        assert_eq!(cipher.decrypt(&tampered), Err(CryptoError::IntegrityCheckFailed));
    }

    #[test]
    fn token_layout_is_nonce_ciphertext_tag() {
        let cipher = ChaChaTokenCipher::new([4; 32]);
        let raw = base64::engine::general_purpose::STANDARD
            .decode(cipher.encrypt(b"abc").unwrap())
            .unwrap();
        assert_eq!(raw.len(), NONCE_LEN + 3 + TAG_LEN);
        assert_ne!(&raw[NONCE_LEN..NONCE_LEN + 3], b"abc");
    }
}
