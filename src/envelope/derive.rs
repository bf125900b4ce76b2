//! src/envelope/derive.rs
//! Textual key → AES key candidates, in priority order.

use crate::aliases::{Aes128Key16, Aes256Key32};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::{Digest, Md5};

/// One way of turning the caller's textual key into AES key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    /// Hex-decode, keep the first 16 bytes.
    HexPrefix,
    /// The 32 ASCII bytes of the key string, used as an AES-256 key.
    RawString32,
    /// First 16 UTF-8 bytes of the key string.
    Utf8Prefix,
    /// MD5 digest of the key string.
    Md5,
    /// Base64-decode, keep the first 16 bytes.
    Base64Prefix,
}

/// Derivations tried, highest priority first.
pub const KEY_DERIVATIONS: [KeyDerivation; 5] = [
    KeyDerivation::HexPrefix,
    KeyDerivation::RawString32,
    KeyDerivation::Utf8Prefix,
    KeyDerivation::Md5,
    KeyDerivation::Base64Prefix,
];

/// A derived AES key. The variant selects AES-128 or AES-256.
pub enum CandidateKey {
    Aes128(Aes128Key16),
    Aes256(Aes256Key32),
}

impl std::fmt::Debug for CandidateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateKey::Aes128(_) => f.write_str("CandidateKey::Aes128(..)"),
            CandidateKey::Aes256(_) => f.write_str("CandidateKey::Aes256(..)"),
        }
    }
}

impl CandidateKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CandidateKey::Aes128(k) => k.expose_secret(),
            CandidateKey::Aes256(k) => k.expose_secret(),
        }
    }

    #[must_use]
    pub fn aes128(&self) -> Option<&[u8; 16]> {
        match self {
            CandidateKey::Aes128(k) => Some(k.expose_secret()),
            CandidateKey::Aes256(_) => None,
        }
    }
}

fn prefix16(bytes: &[u8]) -> Option<CandidateKey> {
    let mut key = [0u8; 16];
    key.copy_from_slice(bytes.get(..16)?);
    Some(CandidateKey::Aes128(Aes128Key16::new(key)))
}

impl KeyDerivation {
    /// Derive a key, or `None` when `key` has the wrong shape for this rule.
    #[must_use]
    pub fn derive(self, key: &str) -> Option<CandidateKey> {
        let text = key.trim();
        match self {
            KeyDerivation::HexPrefix => prefix16(&hex::decode(text).ok()?),
            KeyDerivation::RawString32 => {
                let bytes: [u8; 32] = text.as_bytes().try_into().ok()?;
                Some(CandidateKey::Aes256(Aes256Key32::new(bytes)))
            }
            KeyDerivation::Utf8Prefix => prefix16(text.as_bytes()),
            KeyDerivation::Md5 => {
                let digest: [u8; 16] = Md5::digest(text.as_bytes()).into();
                Some(CandidateKey::Aes128(Aes128Key16::new(digest)))
            }
            KeyDerivation::Base64Prefix => prefix16(&STANDARD.decode(text).ok()?),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            KeyDerivation::HexPrefix => "hex16",
            KeyDerivation::RawString32 => "raw32",
            KeyDerivation::Utf8Prefix => "utf8-16",
            KeyDerivation::Md5 => "md5",
            KeyDerivation::Base64Prefix => "base64-16",
        }
    }
}
