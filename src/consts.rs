//! # Constants
//!
//! On-disk geometry of the page-encrypted database, key-derivation parameters,
//! memory-scan tuning defaults and the media magics the engine recognises.

// ─────────────────────────────────────────────────────────────────────────────
// Page cipher geometry
// ─────────────────────────────────────────────────────────────────────────────

/// Default database page size in bytes.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Length of the salt stored at the start of page 0.
pub const SALT_SIZE: usize = 16;

/// AES block size.
pub const BLOCK_SIZE: usize = 16;

/// Per-page CBC IV length.
pub const IV_SIZE: usize = 16;

/// HMAC-SHA512 tag length.
pub const HMAC_SIZE: usize = 64;

/// Trailing bytes of every page holding IV + HMAC, rounded up to whole blocks.
pub const RESERVE_SIZE: usize = (IV_SIZE + HMAC_SIZE).div_ceil(BLOCK_SIZE) * BLOCK_SIZE;

/// Header written at the start of every decrypted database.
pub const PLAINTEXT_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Number of header bytes compared when detecting an already-plaintext file.
pub const PLAINTEXT_MAGIC_LEN: usize = 15;

/// PBKDF2-HMAC-SHA512 rounds for the page encryption key.
pub const DEFAULT_KDF_ITERATIONS: u32 = 256_000;

/// PBKDF2-HMAC-SHA512 rounds for the page MAC key.
pub const MAC_KDF_ITERATIONS: u32 = 2;

/// Byte XORed into the file salt to form the MAC-key salt.
pub const MAC_SALT_MASK: u8 = 0x3a;

/// Pages between progress callbacks / cooperative yields.
pub const DEFAULT_PROGRESS_INTERVAL: u32 = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Memory scanner
// ─────────────────────────────────────────────────────────────────────────────

/// Bytes read from a region per `read_at` call.
pub const SCAN_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Bytes carried from the end of one chunk into the next.
/// One UTF-16LE candidate (64 bytes) plus its leading boundary byte.
pub const SCAN_CHUNK_OVERLAP: usize = 65;

/// Regions larger than this are skipped.
pub const MAX_REGION_SIZE: usize = 100 * 1024 * 1024;

/// Full passes over the target before giving up.
pub const DEFAULT_SCAN_ATTEMPTS: u32 = 3;

/// Delay between scan attempts, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Alphanumeric characters in a key candidate.
pub const KEY_CANDIDATE_CHARS: usize = 32;

/// Key bytes actually used from a candidate.
pub const AES128_KEY_SIZE: usize = 16;

/// Default filename suffix of template files.
pub const DEFAULT_TEMPLATE_SUFFIX: &str = "_t.dat";

/// Templates considered per scan (newest first).
pub const DEFAULT_MAX_TEMPLATES: usize = 16;

/// Signature at offset 0 of a template carrying a verifiable AES block.
pub const DAT_V2_SIGNATURE: [u8; 6] = [0x07, 0x08, 0x56, 0x32, 0x08, 0x07];

/// Signature of the older variant that uses a fixed AES key.
pub const DAT_V1_SIGNATURE: [u8; 6] = [0x07, 0x08, 0x56, 0x31, 0x08, 0x07];

/// Fixed AES key of the V1 `.dat` variant.
pub const DAT_V1_AES_KEY: &[u8; 16] = b"cfcd208495d565ef";

/// Length of the `.dat` container header (signature + two LE32 lengths + pad).
pub const DAT_HEADER_SIZE: usize = 15;

/// Offset of the 16-byte ciphertext sample inside a template.
pub const SAMPLE_OFFSET: usize = DAT_HEADER_SIZE;

/// JPEG end-of-image marker, used to derive the XOR byte from template trailers.
pub const JPEG_EOI: [u8; 2] = [0xff, 0xd9];

// ─────────────────────────────────────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────────────────────────────────────

/// JPEG start-of-image marker.
pub const JPEG_SOI: [u8; 3] = [0xff, 0xd8, 0xff];

/// Keystream bytes applied to video payloads; enough to expose the container header.
pub const VIDEO_DECRYPT_LIMIT: usize = 128 * 1024;

/// ISAAC64 words per generated block.
pub const ISAAC64_WORDS: usize = 256;

/// Bytes per generated keystream block.
pub const KEYSTREAM_BLOCK_SIZE: usize = ISAAC64_WORDS * 8;

/// AES-GCM nonce length.
pub const GCM_NONCE_SIZE: usize = 12;

/// AES-GCM tag length.
pub const GCM_TAG_SIZE: usize = 16;
