//! src/page/keys.rs
//! Per-file key schedule and page authentication
//!
//! `enc_key = PBKDF2-SHA512(raw_key, salt, N)`,
//! `mac_key = PBKDF2-SHA512(enc_key, salt ^ 0x3a, 2)`.
//! Each page is authenticated over `ciphertext || IV || LE32(page_no)` with
//! page numbers starting at 1.

use crate::aliases::{Aes256Key32, HmacSha512, Salt16};
use crate::consts::{HMAC_SIZE, IV_SIZE, MAC_KDF_ITERATIONS, MAC_SALT_MASK, SALT_SIZE};
use crate::crypto::kdf::pbkdf2::derive_secure_pbkdf2_key;
use crate::error::{RecoveryError, Result};
use crate::page::options::PageCipherOptions;
use hmac::Mac;

/// Encryption and MAC keys for one database file.
///
/// Derived once per file and reused for every page. Never persisted; both
/// buffers are zeroized on drop.
pub struct DerivedKeySet {
    enc_key: Aes256Key32,
    mac_key: Aes256Key32,
}

impl std::fmt::Debug for DerivedKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKeySet { .. }")
    }
}

impl DerivedKeySet {
    #[must_use]
    pub fn enc_key(&self) -> &Aes256Key32 {
        &self.enc_key
    }

    #[must_use]
    pub fn mac_key(&self) -> &Aes256Key32 {
        &self.mac_key
    }

    fn page_mac(&self, page: &[u8], page_index: u64, options: &PageCipherOptions) -> Result<HmacSha512> {
        let offset = if page_index == 0 { SALT_SIZE } else { 0 };
        let page_no = u32::try_from(page_index + 1)
            .map_err(|_| RecoveryError::Format(format!("page index {page_index} out of range")))?;

        let mut mac = <HmacSha512 as Mac>::new_from_slice(self.mac_key.expose_secret())
            .map_err(|e| RecoveryError::KeyFormat(format!("HMAC key rejected: {e}")))?;
        mac.update(&page[offset..options.body_end() + IV_SIZE]);
        mac.update(&page_no.to_le_bytes());
        Ok(mac)
    }

    /// Constant-time check of a full page against its stored HMAC.
    ///
    /// `page` must be exactly `options.page_size()` bytes of ciphertext.
    pub fn verify_page(
        &self,
        page: &[u8],
        page_index: u64,
        options: &PageCipherOptions,
    ) -> Result<bool> {
        let tag_start = options.body_end() + IV_SIZE;
        let stored = &page[tag_start..tag_start + HMAC_SIZE];
        Ok(self
            .page_mac(page, page_index, options)?
            .verify_slice(stored)
            .is_ok())
    }
}

/// Derive the [`DerivedKeySet`] for a file from its raw key and salt.
pub fn derive_keys(raw_key: &Aes256Key32, salt: &Salt16, iterations: u32) -> Result<DerivedKeySet> {
    let mut enc_key = Aes256Key32::new([0u8; 32]);
    derive_secure_pbkdf2_key(
        raw_key.expose_secret(),
        salt.expose_secret(),
        iterations,
        &mut enc_key,
    )?;

    let mut mac_salt = Salt16::new(*salt.expose_secret());
    for byte in mac_salt.expose_secret_mut().iter_mut() {
        *byte ^= MAC_SALT_MASK;
    }

    let mut mac_key = Aes256Key32::new([0u8; 32]);
    derive_secure_pbkdf2_key(
        enc_key.expose_secret(),
        mac_salt.expose_secret(),
        MAC_KDF_ITERATIONS,
        &mut mac_key,
    )?;

    Ok(DerivedKeySet { enc_key, mac_key })
}
