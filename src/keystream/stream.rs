//! src/keystream/stream.rs
//! Target keystream: ISAAC64 blocks, big-endian words, each block reversed.

use crate::consts::{KEYSTREAM_BLOCK_SIZE, VIDEO_DECRYPT_LIMIT};
use crate::error::{RecoveryError, Result};
use crate::keystream::isaac64::Isaac64;
use crate::utils::xor_in_place;

/// How much of a payload the stream is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Whole payload.
    Image,
    /// First [`VIDEO_DECRYPT_LIMIT`] bytes only; the rest is stored in the clear.
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn decrypt_len(self, payload_len: usize) -> usize {
        match self {
            MediaKind::Image => payload_len,
            MediaKind::Video => payload_len.min(VIDEO_DECRYPT_LIMIT),
        }
    }
}

/// Parse a decimal media key into the ISAAC64 seed.
pub fn parse_seed(key: &str) -> Result<u64> {
    let key = key.trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecoveryError::KeyFormat(
            "keystream key must be a decimal number".into(),
        ));
    }
    key.parse::<u64>()
        .map_err(|e| RecoveryError::KeyFormat(format!("keystream key out of range: {e}")))
}

/// Post-processing of one serialized block: the target consumes each
/// big-endian block back to front.
///
/// Reversal is per 2048-byte block so output stays prefix-stable. Streams
/// longer than one block (video heads included) have only been checked for
/// self-consistency; confirm against a real sample decryption over 2048 bytes.
#[inline(always)]
fn reverse_block(block: &mut [u8; KEYSTREAM_BLOCK_SIZE]) {
    block.reverse();
}

/// Incremental keystream. Prefix-stable: the first `n` bytes never depend on
/// how many bytes are requested later.
#[derive(Debug, Clone)]
pub struct Keystream {
    rng: Isaac64,
    block: [u8; KEYSTREAM_BLOCK_SIZE],
    pos: usize,
    fresh: bool,
}

impl Keystream {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Isaac64::new(seed),
            block: [0u8; KEYSTREAM_BLOCK_SIZE],
            pos: KEYSTREAM_BLOCK_SIZE,
            fresh: true,
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Ok(Self::new(parse_seed(key)?))
    }

    fn refill(&mut self) {
        if self.fresh {
            // seeding already produced the first block
            self.fresh = false;
        } else {
            self.rng.generate();
        }

        for (chunk, word) in self
            .block
            .chunks_exact_mut(8)
            .zip(self.rng.results().iter())
        {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        reverse_block(&mut self.block);
        self.pos = 0;
    }

    /// Write the next `out.len()` keystream bytes into `out`.
    pub fn fill(&mut self, out: &mut [u8]) {
        let mut written = 0;
        while written < out.len() {
            if self.pos == KEYSTREAM_BLOCK_SIZE {
                self.refill();
            }
            let take = (out.len() - written).min(KEYSTREAM_BLOCK_SIZE - self.pos);
            out[written..written + take].copy_from_slice(&self.block[self.pos..self.pos + take]);
            self.pos += take;
            written += take;
        }
    }

    /// XOR the next `data.len()` keystream bytes into `data`.
    pub fn apply(&mut self, data: &mut [u8]) {
        let mut buf = [0u8; KEYSTREAM_BLOCK_SIZE];
        for chunk in data.chunks_mut(KEYSTREAM_BLOCK_SIZE) {
            let stream = &mut buf[..chunk.len()];
            self.fill(stream);
            xor_in_place(chunk, stream);
        }
    }
}

/// `length` keystream bytes for a decimal key.
pub fn keystream(key: &str, length: usize) -> Result<Vec<u8>> {
    let mut stream = Keystream::from_key(key)?;
    let mut out = vec![0u8; length];
    stream.fill(&mut out);
    Ok(out)
}

/// Decrypt a media payload in place. Returns the number of bytes touched.
pub fn xor_decrypt(key: &str, data: &mut [u8], kind: MediaKind) -> Result<usize> {
    let len = kind.decrypt_len(data.len());
    Keystream::from_key(key)?.apply(&mut data[..len]);
    Ok(len)
}
