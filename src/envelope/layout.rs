//! src/envelope/layout.rs
//! Declarative layout tables for the envelope search.

use crate::consts::{BLOCK_SIZE, GCM_NONCE_SIZE, GCM_TAG_SIZE};

/// Where nonce, ciphertext and tag sit inside an AES-GCM envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadLayout {
    /// Nonce = first 12 bytes of the key; `[ct][tag]`. Confirmed target format.
    KeyNonce,
    /// `[ct][nonce][tag]`.
    TrailingNonce,
    /// Marker at 0 and 8, LE32 payload length at 10, nonce at 19, payload at 63.
    TaggedBlock,
    /// `[nonce][ct][tag]`.
    LeadingNonce,
    /// All-zero nonce; `[ct][tag]`.
    ZeroNonce,
    /// `[nonce][tag][ct]`.
    NonceTagCiphertext,
}

/// AEAD layouts tried, highest priority first.
pub const AEAD_LAYOUTS: [AeadLayout; 6] = [
    AeadLayout::KeyNonce,
    AeadLayout::TrailingNonce,
    AeadLayout::TaggedBlock,
    AeadLayout::LeadingNonce,
    AeadLayout::ZeroNonce,
    AeadLayout::NonceTagCiphertext,
];

const TAGGED_MARKER_AT: [usize; 2] = [0, 8];
const TAGGED_LEN_AT: usize = 10;
const TAGGED_NONCE_AT: usize = 19;
const TAGGED_PAYLOAD_AT: usize = 63;

/// Borrowed pieces of one AEAD trial.
#[derive(Debug, Clone, Copy)]
pub struct AeadParts<'a> {
    pub nonce: [u8; GCM_NONCE_SIZE],
    pub ciphertext: &'a [u8],
    pub tag: &'a [u8],
}

fn nonce_from(bytes: &[u8]) -> Option<[u8; GCM_NONCE_SIZE]> {
    bytes.get(..GCM_NONCE_SIZE)?.try_into().ok()
}

impl AeadLayout {
    /// Split `data` according to this layout, or `None` if it cannot fit.
    #[must_use]
    pub fn split<'a>(self, data: &'a [u8], key: &[u8]) -> Option<AeadParts<'a>> {
        const N: usize = GCM_NONCE_SIZE;
        const T: usize = GCM_TAG_SIZE;

        match self {
            AeadLayout::KeyNonce | AeadLayout::ZeroNonce => {
                let split = data.len().checked_sub(T)?;
                let nonce = match self {
                    AeadLayout::KeyNonce => nonce_from(key)?,
                    _ => [0u8; N],
                };
                Some(AeadParts {
                    nonce,
                    ciphertext: &data[..split],
                    tag: &data[split..],
                })
            }
            AeadLayout::TrailingNonce => {
                let ct_end = data.len().checked_sub(N + T)?;
                Some(AeadParts {
                    nonce: nonce_from(&data[ct_end..])?,
                    ciphertext: &data[..ct_end],
                    tag: &data[ct_end + N..],
                })
            }
            AeadLayout::TaggedBlock => {
                if data.len() < TAGGED_PAYLOAD_AT {
                    return None;
                }
                let [a, b] = TAGGED_MARKER_AT;
                if data[a..a + 2] != data[b..b + 2] {
                    return None;
                }
                let len = u32::from_le_bytes(
                    data[TAGGED_LEN_AT..TAGGED_LEN_AT + 4].try_into().ok()?,
                ) as usize;
                if len < T {
                    return None;
                }
                let payload = data.get(TAGGED_PAYLOAD_AT..TAGGED_PAYLOAD_AT.checked_add(len)?)?;
                Some(AeadParts {
                    nonce: nonce_from(&data[TAGGED_NONCE_AT..])?,
                    ciphertext: &payload[..len - T],
                    tag: &payload[len - T..],
                })
            }
            AeadLayout::LeadingNonce => {
                let tag_at = data.len().checked_sub(T)?;
                if tag_at < N {
                    return None;
                }
                Some(AeadParts {
                    nonce: nonce_from(data)?,
                    ciphertext: &data[N..tag_at],
                    tag: &data[tag_at..],
                })
            }
            AeadLayout::NonceTagCiphertext => {
                if data.len() < N + T {
                    return None;
                }
                Some(AeadParts {
                    nonce: nonce_from(data)?,
                    ciphertext: &data[N + T..],
                    tag: &data[N..N + T],
                })
            }
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AeadLayout::KeyNonce => "gcm/key-nonce",
            AeadLayout::TrailingNonce => "gcm/trailing-nonce",
            AeadLayout::TaggedBlock => "gcm/tagged-block",
            AeadLayout::LeadingNonce => "gcm/leading-nonce",
            AeadLayout::ZeroNonce => "gcm/zero-nonce",
            AeadLayout::NonceTagCiphertext => "gcm/nonce-tag-ct",
        }
    }
}

/// Unauthenticated AES-128 fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
    /// CBC over the whole envelope, IV = key.
    CbcKeyIv,
    /// CBC, IV = first 16 bytes, ciphertext = the rest.
    CbcLeadingIv,
    /// ECB over the whole envelope.
    Ecb,
}

/// Fallbacks tried after every AEAD layout failed.
pub const FALLBACKS: [FallbackMode; 3] = [
    FallbackMode::CbcKeyIv,
    FallbackMode::CbcLeadingIv,
    FallbackMode::Ecb,
];

impl FallbackMode {
    /// `true` if `data` has a block-aligned body for this mode.
    #[must_use]
    pub fn fits(self, data: &[u8]) -> bool {
        let body = match self {
            FallbackMode::CbcLeadingIv => data.len().saturating_sub(BLOCK_SIZE),
            _ => data.len(),
        };
        body > 0 && body % BLOCK_SIZE == 0
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FallbackMode::CbcKeyIv => "cbc/key-iv",
            FallbackMode::CbcLeadingIv => "cbc/leading-iv",
            FallbackMode::Ecb => "ecb",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_nonce_split() {
        let data = [1u8; 40];
        let key = [9u8; 16];
        let parts = AeadLayout::KeyNonce.split(&data, &key).unwrap();
        assert_eq!(parts.nonce, [9u8; 12]);
        assert_eq!(parts.ciphertext.len(), 24);
        assert_eq!(parts.tag.len(), 16);
    }

    #[test]
    fn trailing_and_leading_nonce() {
        let data: Vec<u8> = (0u8..40).collect();
        let t = AeadLayout::TrailingNonce.split(&data, &[]).unwrap();
        assert_eq!(t.ciphertext, &data[..12]);
        assert_eq!(t.nonce.to_vec(), data[12..24].to_vec());
        assert_eq!(t.tag, &data[24..]);

        let l = AeadLayout::LeadingNonce.split(&data, &[]).unwrap();
        assert_eq!(l.nonce.to_vec(), data[..12].to_vec());
        assert_eq!(l.ciphertext, &data[12..24]);

        let n = AeadLayout::NonceTagCiphertext.split(&data, &[]).unwrap();
        assert_eq!(n.tag, &data[12..28]);
        assert_eq!(n.ciphertext, &data[28..]);
    }

    #[test]
    fn tagged_block_requires_marker_and_length() {
        let mut data = vec![0u8; 63 + 20];
        data[0..2].copy_from_slice(b"WX");
        data[8..10].copy_from_slice(b"WX");
        data[10..14].copy_from_slice(&20u32.to_le_bytes());
        data[19..31].copy_from_slice(&[5u8; 12]);

        let parts = AeadLayout::TaggedBlock.split(&data, &[]).unwrap();
        assert_eq!(parts.nonce, [5u8; 12]);
        assert_eq!(parts.ciphertext.len(), 4);

        data[8] = b'Y';
        assert!(AeadLayout::TaggedBlock.split(&data, &[]).is_none());

        data[8] = b'W';
        data[10..14].copy_from_slice(&100u32.to_le_bytes());
        assert!(AeadLayout::TaggedBlock.split(&data, &[]).is_none());
    }

    #[test]
    fn too_short_inputs() {
        for layout in AEAD_LAYOUTS {
            assert!(layout.split(&[0u8; 8], &[0u8; 16]).is_none(), "{layout:?}");
        }
        assert!(!FallbackMode::CbcLeadingIv.fits(&[0u8; 16]));
        assert!(FallbackMode::Ecb.fits(&[0u8; 32]));
        assert!(!FallbackMode::Ecb.fits(&[0u8; 33]));
    }
}
