//! src/envelope/search.rs
//! Ordered, bounded strategy search with early exit.

use crate::consts::BLOCK_SIZE;
use crate::crypto::block::{aes128_cbc_decrypt, aes128_ecb_decrypt, pkcs7_unpadded_len};
use crate::envelope::derive::{CandidateKey, KeyDerivation, KEY_DERIVATIONS};
use crate::envelope::layout::{AeadLayout, FallbackMode, AEAD_LAYOUTS, FALLBACKS};
use crate::error::{RecoveryError, Result};
use crate::media::detect_image_extension;
use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce, Tag};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::fmt;
use std::io::Read;
use tracing::{debug, info};

/// Extension reported for authenticated payloads without a known magic.
const FALLBACK_EXTENSION: &str = "bin";

/// Cap on inflated output per trial.
const MAX_INFLATED: u64 = 64 * 1024 * 1024;

/// Cipher mode half of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Aead(AeadLayout),
    Fallback(FallbackMode),
}

/// One row of the search table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub derivation: KeyDerivation,
    pub mode: Mode,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Aead(layout) => layout.name(),
            Mode::Fallback(fallback) => fallback.name(),
        };
        write!(f, "{}+{}", self.derivation.name(), mode)
    }
}

/// Successful envelope decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopePlaintext {
    pub plaintext: Vec<u8>,
    /// `jpg`, `png`, `gif`, `webp`, or `bin` for authenticated unknown content.
    pub extension: &'static str,
    pub strategy: Strategy,
}

/// The full ordered strategy table for `key`.
///
/// AEAD rows come layout-major (every derivation for layout 1, then layout 2,
/// …); fallback rows follow for AES-128 keys only.
#[must_use]
pub fn strategy_table(key: &str) -> Vec<Strategy> {
    let keys = derive_all(key);
    build_table(&keys)
}

fn derive_all(key: &str) -> Vec<(KeyDerivation, CandidateKey)> {
    KEY_DERIVATIONS
        .iter()
        .filter_map(|&d| d.derive(key).map(|k| (d, k)))
        .collect()
}

fn build_table(keys: &[(KeyDerivation, CandidateKey)]) -> Vec<Strategy> {
    let aead = AEAD_LAYOUTS.iter().flat_map(|&layout| {
        keys.iter().map(move |(derivation, _)| Strategy {
            derivation: *derivation,
            mode: Mode::Aead(layout),
        })
    });
    let fallback = FALLBACKS.iter().flat_map(|&fallback| {
        keys.iter()
            .filter(|(_, key)| key.aes128().is_some())
            .map(move |(derivation, _)| Strategy {
                derivation: *derivation,
                mode: Mode::Fallback(fallback),
            })
    });
    aead.chain(fallback).collect()
}

/// Decrypt an envelope of unknown layout with one textual key.
pub fn decrypt_envelope(data: &[u8], key: &str) -> Result<EnvelopePlaintext> {
    search(data, key).map_err(|trials| {
        RecoveryError::NotFound(format!("no strategy decrypted the envelope ({trials} trials)"))
    })
}

/// Try several textual keys in order (e.g. a configured key, then the key
/// recovered from process memory). Returns the first success.
pub fn decrypt_envelope_any(data: &[u8], keys: &[&str]) -> Result<EnvelopePlaintext> {
    let mut trials = 0;
    for key in keys {
        match search(data, key) {
            Ok(found) => return Ok(found),
            Err(tried) => trials += tried,
        }
    }
    Err(RecoveryError::NotFound(format!(
        "no strategy decrypted the envelope with {} key(s) ({trials} trials)",
        keys.len()
    )))
}

/// Walk the strategy table for one key. On a miss, returns the trial count.
fn search(data: &[u8], key: &str) -> std::result::Result<EnvelopePlaintext, usize> {
    let keys = derive_all(key);
    let table = build_table(&keys);

    for strategy in &table {
        let candidate = keys
            .iter()
            .find(|(d, _)| *d == strategy.derivation)
            .map(|(_, k)| k);
        let Some(candidate) = candidate else { continue };

        let hit = match strategy.mode {
            Mode::Aead(layout) => try_aead(data, candidate, layout),
            Mode::Fallback(fallback) => try_fallback(data, candidate, fallback),
        };
        if let Some((plaintext, extension)) = hit {
            info!(strategy = %strategy, extension, bytes = plaintext.len(), "envelope decrypted");
            return Ok(EnvelopePlaintext {
                plaintext,
                extension,
                strategy: *strategy,
            });
        }
    }

    debug!(trials = table.len(), bytes = data.len(), "envelope search exhausted");
    Err(table.len())
}

fn try_aead(
    data: &[u8],
    key: &CandidateKey,
    layout: AeadLayout,
) -> Option<(Vec<u8>, &'static str)> {
    let parts = layout.split(data, key.as_bytes())?;
    let mut buffer = parts.ciphertext.to_vec();
    let nonce = Nonce::from_slice(&parts.nonce);
    let tag = Tag::from_slice(parts.tag);

    let verified = match key {
        CandidateKey::Aes128(k) => Aes128Gcm::new_from_slice(k.expose_secret())
            .ok()?
            .decrypt_in_place_detached(nonce, b"", &mut buffer, tag),
        CandidateKey::Aes256(k) => Aes256Gcm::new_from_slice(k.expose_secret())
            .ok()?
            .decrypt_in_place_detached(nonce, b"", &mut buffer, tag),
    };
    verified.ok()?;

    // the tag already proves key + layout; the magic only picks the extension
    Some(match recognise(buffer) {
        Ok(found) => found,
        Err(raw) => (raw, FALLBACK_EXTENSION),
    })
}

fn try_fallback(
    data: &[u8],
    key: &CandidateKey,
    fallback: FallbackMode,
) -> Option<(Vec<u8>, &'static str)> {
    let key = key.aes128()?;
    if !fallback.fits(data) {
        return None;
    }

    let mut plain = match fallback {
        FallbackMode::CbcKeyIv => {
            let mut body = data.to_vec();
            aes128_cbc_decrypt(key, key, &mut body).ok()?;
            body
        }
        FallbackMode::CbcLeadingIv => {
            let iv: [u8; BLOCK_SIZE] = data[..BLOCK_SIZE].try_into().ok()?;
            let mut body = data[BLOCK_SIZE..].to_vec();
            aes128_cbc_decrypt(key, &iv, &mut body).ok()?;
            body
        }
        FallbackMode::Ecb => {
            let mut body = data.to_vec();
            aes128_ecb_decrypt(key, &mut body).ok()?;
            body
        }
    };

    if detect_image_extension(&plain).is_some() {
        if let Some(len) = pkcs7_unpadded_len(&plain) {
            plain.truncate(len);
        }
    }
    recognise(plain).ok()
}

/// Accept `plain` as-is, zlib-inflated or gunzipped if one of them carries an
/// image magic. Hands the buffer back untouched otherwise.
fn recognise(plain: Vec<u8>) -> std::result::Result<(Vec<u8>, &'static str), Vec<u8>> {
    if let Some(ext) = detect_image_extension(&plain) {
        return Ok((plain, ext));
    }

    for inflated in [inflate_zlib(&plain), gunzip(&plain)].into_iter().flatten() {
        if let Some(ext) = detect_image_extension(&inflated) {
            return Ok((inflated, ext));
        }
    }
    Err(plain)
}

fn inflate_zlib(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .take(MAX_INFLATED)
        .read_to_end(&mut out)
        .ok()?;
    (!out.is_empty()).then_some(out)
}

fn gunzip(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .take(MAX_INFLATED)
        .read_to_end(&mut out)
        .ok()?;
    (!out.is_empty()).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_bounded_and_ordered() {
        let table = strategy_table("000102030405060708090a0b0c0d0e0f");
        // 5 derivations × 6 layouts + 3 fallbacks × 4 AES-128 keys
        assert_eq!(table.len(), 42);
        assert_eq!(table[0].derivation, KeyDerivation::HexPrefix);
        assert_eq!(table[0].mode, Mode::Aead(AeadLayout::KeyNonce));
        assert_eq!(table[5].mode, Mode::Aead(AeadLayout::TrailingNonce));
        assert!(table[30..]
            .iter()
            .all(|s| matches!(s.mode, Mode::Fallback(_))));
        assert!(table[30..]
            .iter()
            .all(|s| s.derivation != KeyDerivation::RawString32));
    }

    #[test]
    fn short_key_has_smaller_table() {
        // only md5 applies; "abcd" base64-decodes to 3 bytes
        let table = strategy_table("abcd");
        assert_eq!(table.len(), 6 + 3);
    }

    #[test]
    fn strategy_display() {
        let s = Strategy {
            derivation: KeyDerivation::Md5,
            mode: Mode::Fallback(FallbackMode::Ecb),
        };
        assert_eq!(s.to_string(), "md5+ecb");
    }
}
