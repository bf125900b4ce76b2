//! src/scanner/pattern.rs
//! Key-shaped byte patterns and trial verification
//!
//! The runtime key lives in memory as 32 alphanumeric characters, either one
//! byte each or UTF-16LE. Only the first 16 characters are the AES key.

use crate::consts::{AES128_KEY_SIZE, JPEG_SOI, KEY_CANDIDATE_CHARS};
use crate::crypto::block::aes128_ecb_decrypt;
use crate::scanner::template::CiphertextSample;
use serde::Serialize;

const UTF16_SPAN: usize = KEY_CANDIDATE_CHARS * 2;

/// Encoding a candidate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyShape {
    Ascii,
    Utf16Le,
}

/// A key-shaped string found in memory, not yet verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCandidate {
    pub key: [u8; AES128_KEY_SIZE],
    pub shape: KeyShape,
    pub address: usize,
}

impl KeyCandidate {
    /// The key as its 16 ASCII characters.
    #[must_use]
    pub fn key_string(&self) -> String {
        self.key.iter().map(|&b| b as char).collect()
    }
}

#[inline(always)]
fn is_key_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

#[inline(always)]
fn is_wide_key_char(window: &[u8], i: usize) -> bool {
    i + 1 < window.len() && is_key_char(window[i]) && window[i + 1] == 0
}

/// All candidates in `window`, whose first byte lives at `base_address`.
///
/// ASCII: a maximal run of exactly 32 alphanumerics with a non-alphanumeric
/// byte present on both sides. UTF-16LE: a run of 32 alphanumeric code units
/// followed by a non-matching unit. The preceding unit is only checked when
/// it lies inside `window`, so a window that starts partway through a longer
/// wide string yields its last 32 units as a candidate; trial decryption
/// rejects those.
#[must_use]
pub fn find_candidates(window: &[u8], base_address: usize) -> Vec<KeyCandidate> {
    let mut found = Vec::new();
    find_ascii(window, base_address, &mut found);
    find_utf16(window, base_address, &mut found);
    found
}

fn find_ascii(window: &[u8], base_address: usize, out: &mut Vec<KeyCandidate>) {
    let len = window.len();
    let mut i = 0;
    while i < len {
        if !is_key_char(window[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < len && is_key_char(window[i]) {
            i += 1;
        }
        if i - start == KEY_CANDIDATE_CHARS && start > 0 && i < len {
            let mut key = [0u8; AES128_KEY_SIZE];
            key.copy_from_slice(&window[start..start + AES128_KEY_SIZE]);
            out.push(KeyCandidate {
                key,
                shape: KeyShape::Ascii,
                address: base_address + start,
            });
        }
    }
}

fn find_utf16(window: &[u8], base_address: usize, out: &mut Vec<KeyCandidate>) {
    if window.len() < UTF16_SPAN {
        return;
    }
    for start in 0..=window.len() - UTF16_SPAN {
        if !is_wide_key_char(window, start) {
            continue;
        }
        if start >= 2 && is_wide_key_char(window, start - 2) {
            continue;
        }

        let mut end = start;
        while is_wide_key_char(window, end) {
            end += 2;
        }
        // the terminating code unit must be present
        if (end - start) / 2 != KEY_CANDIDATE_CHARS || end + 2 > window.len() {
            continue;
        }

        let mut key = [0u8; AES128_KEY_SIZE];
        for (k, byte) in key.iter_mut().enumerate() {
            *byte = window[start + 2 * k];
        }
        out.push(KeyCandidate {
            key,
            shape: KeyShape::Utf16Le,
            address: base_address + start,
        });
    }
}

/// `true` if `key` decrypts `sample` (AES-128-ECB) to a JPEG start marker.
#[must_use]
pub fn verify_candidate(key: &[u8; AES128_KEY_SIZE], sample: &CiphertextSample) -> bool {
    let mut block = *sample.as_bytes();
    aes128_ecb_decrypt(key, &mut block).is_ok() && block.starts_with(&JPEG_SOI)
}
