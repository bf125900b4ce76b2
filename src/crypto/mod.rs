// src/crypto/mod.rs

//! Low-level crypto primitives.
//!
//! - [`kdf`]: PBKDF2-HMAC-SHA512 into secure buffers
//! - [`block`]: AES-CBC / AES-ECB block-mode decryption without padding
//!
//! HMAC types are defined in `aliases.rs`.

pub mod block;
pub mod kdf;
