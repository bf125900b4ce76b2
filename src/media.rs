//! # Media decoding
//!
//! Image magic detection shared by the envelope search, plus decoders for the
//! client's `.dat` image containers:
//!
//! - legacy: the whole file XORed with one byte;
//! - V1/V2: `sig[6] | aes_len: LE32 | xor_len: LE32 | pad[1]` followed by an
//!   AES-128-ECB (PKCS#7) region, a clear middle region and an XOR tail.

use crate::consts::{
    AES128_KEY_SIZE, BLOCK_SIZE, DAT_HEADER_SIZE, DAT_V1_AES_KEY, DAT_V1_SIGNATURE,
    DAT_V2_SIGNATURE, JPEG_SOI,
};
use crate::crypto::block::{aes128_ecb_decrypt, pkcs7_unpadded_len};
use crate::error::{RecoveryError, Result};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// File extension for a recognised image magic.
#[must_use]
pub fn detect_image_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&JPEG_SOI) {
        Some("jpg")
    } else if data.starts_with(&PNG_SIGNATURE) {
        Some("png")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("gif")
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

/// XOR byte that turns `data` into a known image, if any.
#[must_use]
pub fn guess_xor_key(data: &[u8]) -> Option<u8> {
    let magics: [&[u8]; 5] = [&JPEG_SOI, &PNG_SIGNATURE, b"GIF8", b"RIFF", b"BM"];
    magics.iter().find_map(|magic| {
        if data.len() < magic.len() {
            return None;
        }
        let key = data[0] ^ magic[0];
        data.iter()
            .zip(magic.iter())
            .all(|(d, m)| d ^ key == *m)
            .then_some(key)
    })
}

/// Decode a legacy single-byte XOR image.
#[must_use]
pub fn decode_xor_image(data: &[u8], xor_key: u8) -> Vec<u8> {
    data.iter().map(|b| b ^ xor_key).collect()
}

/// Container variant of a `.dat` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatVersion {
    /// Whole-file XOR.
    Legacy,
    /// AES region under the fixed V1 key.
    V1,
    /// AES region under the runtime key recovered from memory.
    V2,
}

#[must_use]
pub fn dat_version(data: &[u8]) -> DatVersion {
    if data.starts_with(&DAT_V2_SIGNATURE) {
        DatVersion::V2
    } else if data.starts_with(&DAT_V1_SIGNATURE) {
        DatVersion::V1
    } else {
        DatVersion::Legacy
    }
}

/// Decode any `.dat` image container.
///
/// `aes_key` is the 16-character runtime key; it is only required for V2.
pub fn decode_dat_image(data: &[u8], xor_key: u8, aes_key: Option<&[u8]>) -> Result<Vec<u8>> {
    match dat_version(data) {
        DatVersion::Legacy => Ok(decode_xor_image(data, xor_key)),
        DatVersion::V1 => decode_aes_container(data, xor_key, DAT_V1_AES_KEY),
        DatVersion::V2 => {
            let key = aes_key.ok_or_else(|| {
                RecoveryError::KeyFormat("V2 image requires the runtime AES key".into())
            })?;
            let key: &[u8; AES128_KEY_SIZE] = key
                .get(..AES128_KEY_SIZE)
                .and_then(|k| k.try_into().ok())
                .ok_or_else(|| {
                    RecoveryError::KeyFormat(format!(
                        "runtime AES key must be at least {AES128_KEY_SIZE} bytes, got {}",
                        key.len()
                    ))
                })?;
            decode_aes_container(data, xor_key, key)
        }
    }
}

fn read_le32(data: &[u8], at: usize) -> usize {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]) as usize
}

fn decode_aes_container(data: &[u8], xor_key: u8, key: &[u8; 16]) -> Result<Vec<u8>> {
    if data.len() < DAT_HEADER_SIZE {
        return Err(RecoveryError::Format("dat header truncated".into()));
    }
    let aes_len = read_le32(data, 6);
    let xor_len = read_le32(data, 10);
    let body = &data[DAT_HEADER_SIZE..];

    // PKCS#7 always adds at least one byte, so a block-aligned length gains a block
    let aes_cipher_len = (aes_len / BLOCK_SIZE + 1) * BLOCK_SIZE;
    let aes_cipher_len = aes_cipher_len.min(body.len() / BLOCK_SIZE * BLOCK_SIZE);
    if xor_len > body.len() - aes_cipher_len {
        return Err(RecoveryError::Format(format!(
            "dat regions exceed payload: aes {aes_len}, xor {xor_len}, body {}",
            body.len()
        )));
    }

    let mut aes_region = body[..aes_cipher_len].to_vec();
    aes128_ecb_decrypt(key, &mut aes_region)?;
    let plain_len = pkcs7_unpadded_len(&aes_region).unwrap_or(aes_region.len());
    aes_region.truncate(plain_len);

    let middle_end = body.len() - xor_len;
    let mut out = aes_region;
    out.reserve(body.len() - aes_cipher_len);
    out.extend_from_slice(&body[aes_cipher_len..middle_end]);
    out.extend(body[middle_end..].iter().map(|b| b ^ xor_key));
    Ok(out)
}
