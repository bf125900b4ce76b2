// ============================================================================
// FILE: src/utils.rs
// ============================================================================

//! Utility functions used across the library.

use crate::error::{RecoveryError, Result};

/// Decode a hex string into exactly `N` bytes.
///
/// Surrounding whitespace is ignored. Anything that is not valid hex, or that
/// decodes to a length other than `N`, is a [`RecoveryError::KeyFormat`].
pub fn decode_hex_key<const N: usize>(hex_key: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_key.trim())
        .map_err(|e| RecoveryError::KeyFormat(format!("key is not valid hex: {e}")))?;

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        RecoveryError::KeyFormat(format!("expected {N} key bytes, got {}", bytes.len()))
    })
}

/// XORs two 16-byte blocks and writes the result to `output`.
///
/// Used by the CBC paths in [`crate::crypto::block`].
///
/// # Panics (by contract)
///
/// Panics if any slice is shorter than 16 bytes. Callers only pass AES blocks.
#[inline(always)]
pub const fn xor_blocks(block_a: &[u8], block_b: &[u8], output: &mut [u8]) {
    let mut i = 0;
    while i < 16 {
        output[i] = block_a[i] ^ block_b[i];
        i += 1;
    }
}

/// XOR `data` in place with `stream`, stopping at the shorter of the two.
#[inline]
pub fn xor_in_place(data: &mut [u8], stream: &[u8]) {
    for (byte, key) in data.iter_mut().zip(stream) {
        *byte ^= key;
    }
}

/// `true` when every byte of `data` is zero.
#[inline]
pub fn is_all_zero(data: &[u8]) -> bool {
    data.iter().all(|&b| b == 0)
}
