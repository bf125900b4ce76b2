//! src/crypto/block.rs
//! AES block-mode decryption (no padding handling) over caller buffers.
//!
//! CBC is chained by hand with [`xor_blocks`], the same way the page stream
//! is processed: decrypt one block, XOR with the previous ciphertext block.

use crate::aliases::Aes256Key32;
use crate::consts::BLOCK_SIZE;
use crate::error::{RecoveryError, Result};
use crate::utils::xor_blocks;
use aes::cipher::consts::U16;
use aes::cipher::{BlockDecrypt, BlockSizeUser, KeyInit};
use aes::{Aes128Dec, Aes256Dec, Block as AesBlock};

#[inline(always)]
fn check_block_aligned(data: &[u8]) -> Result<()> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(RecoveryError::Format(format!(
            "ciphertext length {} is not a multiple of {BLOCK_SIZE}",
            data.len()
        )));
    }
    Ok(())
}

/// CBC-decrypt `data` in place with any 128-bit-block cipher.
#[inline(always)]
pub fn cbc_decrypt_in_place<C>(cipher: &C, iv: &[u8; 16], data: &mut [u8]) -> Result<()>
where
    C: BlockDecrypt + BlockSizeUser<BlockSize = U16>,
{
    check_block_aligned(data)?;

    let mut previous = *iv;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut saved = [0u8; 16];
        saved.copy_from_slice(chunk);

        cipher.decrypt_block(AesBlock::from_mut_slice(chunk));

        let mut plain = [0u8; 16];
        xor_blocks(chunk, &previous, &mut plain);
        chunk.copy_from_slice(&plain);

        previous = saved;
    }
    Ok(())
}

/// ECB-decrypt `data` in place with any 128-bit-block cipher.
#[inline(always)]
pub fn ecb_decrypt_in_place<C>(cipher: &C, data: &mut [u8]) -> Result<()>
where
    C: BlockDecrypt + BlockSizeUser<BlockSize = U16>,
{
    check_block_aligned(data)?;

    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(AesBlock::from_mut_slice(chunk));
    }
    Ok(())
}

/// AES-256-CBC in place, used for page bodies.
#[inline(always)]
pub fn aes256_cbc_decrypt(key: &Aes256Key32, iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
    let cipher = Aes256Dec::new(key.expose_secret().into());
    cbc_decrypt_in_place(&cipher, iv, data)
}

/// AES-128-CBC in place.
#[inline(always)]
pub fn aes128_cbc_decrypt(key: &[u8; 16], iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
    let cipher = Aes128Dec::new(key.into());
    cbc_decrypt_in_place(&cipher, iv, data)
}

/// AES-128-ECB in place.
#[inline(always)]
pub fn aes128_ecb_decrypt(key: &[u8; 16], data: &mut [u8]) -> Result<()> {
    let cipher = Aes128Dec::new(key.into());
    ecb_decrypt_in_place(&cipher, data)
}

/// Length of `data` with a valid PKCS#7 trailer removed, or `None`.
pub fn pkcs7_unpadded_len(data: &[u8]) -> Option<usize> {
    let pad = *data.last()? as usize;
    if pad == 0 || pad > BLOCK_SIZE || pad > data.len() {
        return None;
    }
    data[data.len() - pad..]
        .iter()
        .all(|&b| b as usize == pad)
        .then_some(data.len() - pad)
}
