//! src/scanner/scan.rs
//! Chunked memory sweep, retry loop and the top-level key recovery

use crate::error::{RecoveryError, Result};
use crate::scanner::config::ScanConfig;
use crate::scanner::pattern::{find_candidates, verify_candidate, KeyCandidate};
use crate::scanner::process::ProcessMemory;
use crate::scanner::region::MemoryReader;
use crate::scanner::template::{
    derive_xor_key, find_ciphertext_sample, load_templates, CiphertextSample,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Keys recovered for media decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub xor_key: u8,
    /// The 16-character AES key; `None` when no template carried a sample.
    pub aes_key: Option<String>,
}

/// One pass over every eligible region of `reader`.
///
/// Regions larger than the configured limit are skipped, as are regions that
/// fail to read (they may be unmapped while we walk them).
pub fn scan_reader<M: MemoryReader + ?Sized>(
    reader: &M,
    sample: &CiphertextSample,
    config: &ScanConfig,
) -> Result<Option<KeyCandidate>> {
    let regions = reader.regions()?;
    let chunk = config.chunk_size();
    let overlap = config.overlap();
    let mut buf = vec![0u8; chunk + overlap];
    let mut tried: HashSet<[u8; 16]> = HashSet::new();
    let mut scanned: u64 = 0;

    for region in regions {
        if region.size == 0 || region.size > config.max_region_size() {
            continue;
        }

        let mut carry = 0usize;
        let mut pos = region.base_address;
        while pos < region.end() {
            let want = chunk.min(region.end() - pos);
            let n = match reader.read_at(pos, &mut buf[carry..carry + want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(base = region.base_address, error = %e, "region unreadable, skipped");
                    break;
                }
            };
            scanned += n as u64;

            let window = &buf[..carry + n];
            for candidate in find_candidates(window, pos - carry) {
                if tried.insert(candidate.key) && verify_candidate(&candidate.key, sample) {
                    info!(
                        address = candidate.address,
                        shape = ?candidate.shape,
                        "runtime key verified"
                    );
                    return Ok(Some(candidate));
                }
            }

            let keep = overlap.min(window.len());
            let len = window.len();
            buf.copy_within(len - keep..len, 0);
            carry = keep;
            pos += n;
        }
    }

    debug!(bytes = scanned, candidates = tried.len(), "scan pass finished");
    Ok(None)
}

/// Sweep with retries, opening a fresh reader for every attempt.
///
/// An error from the final attempt is returned as is; a clean miss on every
/// attempt is [`RecoveryError::NotFound`].
pub fn scan_for_key<M, F>(
    mut open: F,
    sample: &CiphertextSample,
    config: &ScanConfig,
) -> Result<KeyCandidate>
where
    M: MemoryReader,
    F: FnMut() -> Result<M>,
{
    let attempts = config.attempts();
    for attempt in 1..=attempts {
        let pass = open().and_then(|reader| scan_reader(&reader, sample, config));
        match pass {
            Ok(Some(candidate)) => return Ok(candidate),
            Ok(None) => info!(attempt, attempts, "no key found in this pass"),
            Err(e) if attempt == attempts => return Err(e),
            Err(e) => warn!(attempt, attempts, error = %e, "scan attempt failed"),
        }
        if attempt < attempts {
            std::thread::sleep(config.retry_delay());
        }
    }
    Err(RecoveryError::NotFound(format!(
        "runtime key not found after {attempts} attempt(s)"
    )))
}

/// Recover the media keys from a live process.
pub fn recover_keys(
    pid: u32,
    template_dir: impl AsRef<Path>,
    config: &ScanConfig,
) -> Result<ScanOutcome> {
    info!(pid, "recovering keys from process");
    recover_keys_with(template_dir, config, || ProcessMemory::open(pid))
}

/// Recover the media keys using any memory source, e.g. a saved dump.
pub fn recover_keys_with<M, F>(
    template_dir: impl AsRef<Path>,
    config: &ScanConfig,
    open: F,
) -> Result<ScanOutcome>
where
    M: MemoryReader,
    F: FnMut() -> Result<M>,
{
    let template_dir = template_dir.as_ref();
    let templates = load_templates(template_dir, config)?;
    let xor_key = derive_xor_key(&templates).ok_or_else(|| {
        RecoveryError::NotFound(format!(
            "no template under {} yields an XOR key",
            template_dir.display()
        ))
    })?;
    debug!(xor_key, "xor key derived");

    let Some(sample) = find_ciphertext_sample(&templates) else {
        warn!("no V2 template found; AES key not recovered");
        return Ok(ScanOutcome { xor_key, aes_key: None });
    };

    let candidate = scan_for_key(open, &sample, config)?;
    Ok(ScanOutcome {
        xor_key,
        aes_key: Some(candidate.key_string()),
    })
}
