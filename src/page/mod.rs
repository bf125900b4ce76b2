// src/page/mod.rs

//! Page cipher engine for the page-encrypted database.
//!
//! Core API: `decrypt_database(input, output, key_hex)?` for full file handling.
//! Helpers: [`decrypt_pages`] for custom `Read`/`Write` flows, [`verify_key`]
//! to test a candidate key without writing anything, [`DerivedKeySet`] for
//! callers that cache derived keys themselves.

pub(crate) mod decrypt;
pub(crate) mod keys;
pub(crate) mod options;
pub(crate) mod read;

pub use decrypt::{
    decrypt_database, decrypt_database_with, decrypt_pages, verify_key, DecryptReport,
    PageCorruption, PageProgress,
};
pub use keys::{derive_keys, DerivedKeySet};
pub use options::PageCipherOptions;
pub use read::{is_plaintext_database, read_page};
