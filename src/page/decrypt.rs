//! src/page/decrypt.rs
//! Page-by-page database decryption
//!
//! Pages are processed strictly in order through one reusable buffer. The
//! header HMAC on page 0 gates every write: a wrong key never produces output.

use crate::aliases::{Aes256Key32, Iv16, Salt16};
use crate::consts::{IV_SIZE, PLAINTEXT_HEADER, SALT_SIZE};
use crate::crypto::block::aes256_cbc_decrypt;
use crate::error::{RecoveryError, Result};
use crate::page::keys::{derive_keys, DerivedKeySet};
use crate::page::options::PageCipherOptions;
use crate::page::read::{is_plaintext_database, read_page};
use crate::utils::{decode_hex_key, is_all_zero};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// A page whose stored HMAC did not verify. It was decrypted anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCorruption {
    /// Zero-based page index.
    pub page: u64,
}

/// Summary of one decryption run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecryptReport {
    /// Full pages written (including zero pages).
    pub pages: u64,
    /// All-zero pages copied through without AES.
    pub zero_pages: u64,
    /// Input already carried the plaintext magic and was copied verbatim.
    pub already_plaintext: bool,
    /// Pages that failed their integrity check (PartialCorruption).
    pub corrupted_pages: Vec<PageCorruption>,
    /// Bytes of a trailing partial page copied verbatim.
    pub trailing_bytes: usize,
}

/// Progress notification emitted every `progress_interval` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub pages_done: u64,
    /// Known only for file-backed input.
    pub total_pages: Option<u64>,
}

/// Decrypt a database file with default options.
///
/// `raw_key_hex` must be 64 hex characters (32 bytes); anything else fails
/// with [`RecoveryError::KeyFormat`] before the input is opened.
pub fn decrypt_database(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    raw_key_hex: &str,
) -> Result<DecryptReport> {
    decrypt_database_with(
        input_path,
        output_path,
        raw_key_hex,
        &PageCipherOptions::default(),
        |_| {},
    )
}

/// Decrypt a database file.
///
/// The output is written to a temporary file next to `output_path` and
/// renamed into place only after every page has been written. On failure the
/// output path is left as it was.
pub fn decrypt_database_with<P>(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    raw_key_hex: &str,
    options: &PageCipherOptions,
    mut progress: P,
) -> Result<DecryptReport>
where
    P: FnMut(PageProgress),
{
    let raw_key = Aes256Key32::new(decode_hex_key::<32>(raw_key_hex)?);
    options.validate()?;

    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();

    let input = File::open(input_path)?;
    let total_pages = input.metadata()?.len().div_ceil(options.page_size() as u64);
    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        total_pages,
        "decrypting database"
    );

    let out_dir = match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(out_dir)?;

    let report = {
        let mut writer = BufWriter::new(staging.as_file_mut());
        let report = decrypt_stream(
            BufReader::new(input),
            &mut writer,
            &raw_key,
            options,
            Some(total_pages),
            &mut progress,
        )?;
        writer.flush()?;
        report
    };

    staging.as_file().sync_all()?;
    staging.persist(output_path).map_err(|e| e.error)?;

    info!(
        pages = report.pages,
        corrupted = report.corrupted_pages.len(),
        already_plaintext = report.already_plaintext,
        "database decrypted"
    );
    Ok(report)
}

/// Decrypt a page stream from `reader` into `writer`.
///
/// Nothing is written to `writer` unless the header HMAC verifies (or the
/// input is already plaintext).
pub fn decrypt_pages<R, W, P>(
    reader: R,
    writer: W,
    raw_key: &Aes256Key32,
    options: &PageCipherOptions,
    mut progress: P,
) -> Result<DecryptReport>
where
    R: Read,
    W: Write,
    P: FnMut(PageProgress),
{
    options.validate()?;
    decrypt_stream(reader, writer, raw_key, options, None, &mut progress)
}

/// Check `raw_key_hex` against the database header without writing anything.
///
/// Returns `Ok(true)` for already-plaintext files.
pub fn verify_key(
    input_path: impl AsRef<Path>,
    raw_key_hex: &str,
    options: &PageCipherOptions,
) -> Result<bool> {
    let raw_key = Aes256Key32::new(decode_hex_key::<32>(raw_key_hex)?);
    options.validate()?;

    let mut input = File::open(input_path)?;
    let mut page = vec![0u8; options.page_size()];
    let read = read_page(&mut input, &mut page)?;

    if is_plaintext_database(&page[..read]) {
        return Ok(true);
    }
    if read < options.page_size() {
        return Err(short_header(read));
    }

    let keys = derive_keys(&raw_key, &salt_of(&page), options.kdf_iterations())?;
    keys.verify_page(&page, 0, options)
}

fn short_header(read: usize) -> RecoveryError {
    RecoveryError::Format(format!(
        "database is {read} bytes, shorter than one page"
    ))
}

fn salt_of(page0: &[u8]) -> Salt16 {
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&page0[..SALT_SIZE]);
    Salt16::new(salt)
}

fn decrypt_stream<R, W>(
    mut reader: R,
    mut writer: W,
    raw_key: &Aes256Key32,
    options: &PageCipherOptions,
    total_pages: Option<u64>,
    progress: &mut dyn FnMut(PageProgress),
) -> Result<DecryptReport>
where
    R: Read,
    W: Write,
{
    let page_size = options.page_size();
    let mut page = vec![0u8; page_size];
    let mut report = DecryptReport::default();

    let read = read_page(&mut reader, &mut page)?;
    if is_plaintext_database(&page[..read]) {
        debug!("input already carries the plaintext header; copying verbatim");
        writer.write_all(&page[..read])?;
        io::copy(&mut reader, &mut writer)?;
        report.already_plaintext = true;
        return Ok(report);
    }
    if read < page_size {
        return Err(short_header(read));
    }

    let keys = derive_keys(raw_key, &salt_of(&page), options.kdf_iterations())?;
    if !keys.verify_page(&page, 0, options)? {
        return Err(RecoveryError::KeyValidation(
            "header HMAC mismatch: wrong key for this database".into(),
        ));
    }
    debug!("header HMAC verified");

    writer.write_all(PLAINTEXT_HEADER)?;

    let interval = u64::from(options.progress_interval());
    let mut index: u64 = 0;
    loop {
        decrypt_page(&keys, &mut page, index, options, &mut report)?;
        let offset = if index == 0 { SALT_SIZE } else { 0 };
        writer.write_all(&page[offset..])?;
        report.pages += 1;
        index += 1;

        if index % interval == 0 {
            progress(PageProgress {
                pages_done: index,
                total_pages,
            });
            std::thread::yield_now();
        }

        match read_page(&mut reader, &mut page)? {
            0 => break,
            n if n == page_size => {}
            n => {
                warn!(page = index, bytes = n, "trailing partial page copied verbatim");
                writer.write_all(&page[..n])?;
                report.trailing_bytes = n;
                break;
            }
        }
    }

    if index % interval != 0 {
        progress(PageProgress {
            pages_done: index,
            total_pages,
        });
    }
    Ok(report)
}

/// Decrypt one full page in place. The reserve region is left untouched.
fn decrypt_page(
    keys: &DerivedKeySet,
    page: &mut [u8],
    index: u64,
    options: &PageCipherOptions,
    report: &mut DecryptReport,
) -> Result<()> {
    if is_all_zero(page) {
        report.zero_pages += 1;
        return Ok(());
    }

    // page 0 was authenticated before the first write
    if index > 0 && !keys.verify_page(page, index, options)? {
        warn!(page = index, "PartialCorruption: page HMAC mismatch, decrypting anyway");
        report.corrupted_pages.push(PageCorruption { page: index });
    }

    let body_end = options.body_end();
    let mut iv = Iv16::new([0u8; IV_SIZE]);
    iv.expose_secret_mut()
        .copy_from_slice(&page[body_end..body_end + IV_SIZE]);

    let offset = if index == 0 { SALT_SIZE } else { 0 };
    aes256_cbc_decrypt(keys.enc_key(), iv.expose_secret(), &mut page[offset..body_end])
}
