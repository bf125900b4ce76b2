//! src/crypto/kdf/pbkdf2.rs

use crate::aliases::{Aes256Key32, HmacSha512};
use crate::error::{RecoveryError, Result};

use pbkdf2::pbkdf2;

/// Derive PBKDF2-HMAC-SHA512 directly into an [`Aes256Key32`] buffer.
///
/// `password` and `salt` are raw bytes: the page cipher feeds a raw key (or a
/// previously derived key) rather than a human password.
#[inline(always)]
pub fn derive_secure_pbkdf2_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    out_key: &mut Aes256Key32,
) -> Result<()> {
    if iterations == 0 {
        return Err(RecoveryError::KeyFormat(
            "PBKDF2 iterations must be ≥1".into(),
        ));
    }

    pbkdf2::<HmacSha512>(password, salt, iterations, out_key.expose_secret_mut())
        .map_err(|e| RecoveryError::KeyFormat(format!("PBKDF2 failed: {e}")))?;

    Ok(())
}
