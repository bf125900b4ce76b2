// src/lib.rs

#![deny(unsafe_code)]

pub mod aliases;
#[cfg(feature = "batch-ops")]
pub mod batch_ops;
pub mod consts;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keystream;
pub mod media;
pub mod page;
pub mod scanner;
pub mod utils;

// High-level API
pub use envelope::{decrypt_envelope, decrypt_envelope_any, EnvelopePlaintext};
pub use error::{RecoveryError, Result};
pub use keystream::{keystream, xor_decrypt, MediaKind};
pub use media::decode_dat_image;
pub use page::{
    decrypt_database, decrypt_database_with, verify_key, DecryptReport, PageCipherOptions,
};
pub use scanner::{recover_keys, ScanConfig, ScanOutcome};

// Low-level KDF, public for callers that drive `decrypt_pages` themselves
pub use crypto::kdf::pbkdf2::derive_secure_pbkdf2_key;

#[cfg(feature = "batch-ops")]
pub use batch_ops::decrypt_batch;
