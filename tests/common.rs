//! tests/common.rs
//! Shared fixtures: a page-file encryptor and scanner samples
//!
//! The crate only decrypts, so tests build their own encrypted databases with
//! the same key schedule and page layout.

#![allow(dead_code)] // not every test file uses every helper

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use hmac::{Hmac, Mac};
use msgcrypt_rs::aliases::{Aes256Key32, Salt16};
use msgcrypt_rs::consts::{HMAC_SIZE, IV_SIZE, PLAINTEXT_HEADER, SALT_SIZE};
use msgcrypt_rs::page::derive_keys;
use msgcrypt_rs::PageCipherOptions;
use sha2::Sha512;
use tracing_subscriber::EnvFilter;

/// Fast PBKDF2 round count for tests; performance is covered in benches/.
pub const TEST_ITERATIONS: u32 = 2;

/// Raw database key used across page tests.
pub const TEST_KEY_HEX: &str = "00112233445566778899aabbccddeeff102132435465768798a9bacbdcedfe0f";

pub const TEST_SALT: [u8; SALT_SIZE] = *b"fixture-salt-16b";

/// Route `tracing` events to the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_options() -> PageCipherOptions {
    PageCipherOptions::new()
        .with_kdf_iterations(TEST_ITERATIONS)
        .with_progress_interval(3)
}

pub fn test_key() -> [u8; 32] {
    let bytes = hex::decode(TEST_KEY_HEX).unwrap();
    bytes.try_into().unwrap()
}

/// `pages` pages of deterministic plaintext; page 0 starts with the file magic.
pub fn plain_database(pages: usize, page_size: usize) -> Vec<u8> {
    let mut data: Vec<u8> = (0..pages * page_size)
        .map(|i| (i.wrapping_mul(31) ^ (i >> 7)) as u8)
        .collect();
    data[..PLAINTEXT_HEADER.len()].copy_from_slice(PLAINTEXT_HEADER);
    data
}

/// Encrypt a plaintext database page by page.
///
/// All-zero pages stay all-zero. Each page's reserve region holds a
/// deterministic IV followed by the page HMAC.
pub fn encrypt_database(plain: &[u8], raw_key: &[u8; 32], options: &PageCipherOptions) -> Vec<u8> {
    let page_size = options.page_size();
    let body_end = options.body_end();
    assert_eq!(plain.len() % page_size, 0);

    let keys = derive_keys(
        &Aes256Key32::new(*raw_key),
        &Salt16::new(TEST_SALT),
        options.kdf_iterations(),
    )
    .unwrap();
    let cipher = Aes256::new(GenericArray::from_slice(keys.enc_key().expose_secret()));

    let mut out = Vec::with_capacity(plain.len());
    for (index, src) in plain.chunks(page_size).enumerate() {
        if src.iter().all(|&b| b == 0) {
            out.extend_from_slice(src);
            continue;
        }

        let offset = if index == 0 { SALT_SIZE } else { 0 };
        let mut page = src.to_vec();
        if index == 0 {
            page[..SALT_SIZE].copy_from_slice(&TEST_SALT);
        }

        let iv = [0xa5 ^ index as u8; IV_SIZE];
        let mut prev = iv;
        for block in page[offset..body_end].chunks_mut(16) {
            for (b, p) in block.iter_mut().zip(prev.iter()) {
                *b ^= p;
            }
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
            prev.copy_from_slice(block);
        }
        page[body_end..body_end + IV_SIZE].copy_from_slice(&iv);

        let mut mac = <Hmac<Sha512> as Mac>::new_from_slice(keys.mac_key().expose_secret()).unwrap();
        mac.update(&page[offset..body_end + IV_SIZE]);
        mac.update(&(index as u32 + 1).to_le_bytes());
        let tag = mac.finalize().into_bytes();
        page[body_end + IV_SIZE..body_end + IV_SIZE + HMAC_SIZE].copy_from_slice(&tag);

        out.extend_from_slice(&page);
    }
    out
}

/// AES-128-ECB encryption of whole blocks.
pub fn aes128_ecb_encrypt(key: &[u8; 16], data: &mut [u8]) {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    for block in data.chunks_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
}

/// AES-128-CBC encryption of whole blocks.
pub fn aes128_cbc_encrypt(key: &[u8; 16], iv: &[u8; 16], data: &mut [u8]) {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut prev = *iv;
    for block in data.chunks_mut(16) {
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
        prev.copy_from_slice(block);
    }
}

/// Append PKCS#7 padding up to the next 16-byte boundary.
pub fn pkcs7_pad(data: &mut Vec<u8>) {
    let pad = 16 - data.len() % 16;
    data.extend(std::iter::repeat(pad as u8).take(pad));
}

/// The ciphertext sample a V2 template would carry for `key`.
pub fn jpeg_sample_for(key: &[u8; 16]) -> [u8; 16] {
    let mut block = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1];
    aes128_ecb_encrypt(key, &mut block);
    block
}
