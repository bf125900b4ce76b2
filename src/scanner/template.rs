//! src/scanner/template.rs
//! Template files: XOR-byte vote and ciphertext sample extraction
//!
//! Templates are encrypted JPEG thumbnails. Their last two bytes are the JPEG
//! end marker `FF D9` XORed with the media XOR byte, and V2 templates carry an
//! AES-128-ECB block of the JPEG header right after the container header.

use crate::consts::{AES128_KEY_SIZE, DAT_V2_SIGNATURE, JPEG_EOI, SAMPLE_OFFSET};
use crate::error::Result;
use crate::scanner::config::ScanConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// One 16-byte AES block used only to verify key candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiphertextSample([u8; AES128_KEY_SIZE]);

impl CiphertextSample {
    #[must_use]
    pub const fn new(block: [u8; AES128_KEY_SIZE]) -> Self {
        Self(block)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; AES128_KEY_SIZE] {
        &self.0
    }
}

/// A template file loaded from disk.
#[derive(Debug, Clone)]
pub struct Template {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl AsRef<[u8]> for Template {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// XOR byte implied by one template's trailer, if self-consistent.
fn trailer_vote(data: &[u8]) -> Option<u8> {
    let [a, b] = *data.last_chunk::<2>()?;
    let key = a ^ JPEG_EOI[0];
    (key == b ^ JPEG_EOI[1]).then_some(key)
}

/// Majority vote of the XOR byte over all self-consistent templates.
///
/// Ties go to the smallest byte value so the result is deterministic.
#[must_use]
pub fn derive_xor_key<T: AsRef<[u8]>>(templates: &[T]) -> Option<u8> {
    let mut votes: BTreeMap<u8, usize> = BTreeMap::new();
    for template in templates {
        if let Some(key) = trailer_vote(template.as_ref()) {
            *votes.entry(key).or_default() += 1;
        }
    }
    debug!(candidates = votes.len(), "xor key vote");

    let mut best: Option<(u8, usize)> = None;
    for (key, count) in votes {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

/// Sample block from the first V2 template.
#[must_use]
pub fn find_ciphertext_sample<T: AsRef<[u8]>>(templates: &[T]) -> Option<CiphertextSample> {
    templates.iter().find_map(|template| {
        let data = template.as_ref();
        if !data.starts_with(&DAT_V2_SIGNATURE) {
            return None;
        }
        let block = data.get(SAMPLE_OFFSET..SAMPLE_OFFSET + AES128_KEY_SIZE)?;
        block.try_into().ok().map(CiphertextSample::new)
    })
}

/// Load templates under `dir` (recursively), newest first, capped by config.
pub fn load_templates(dir: impl AsRef<Path>, config: &ScanConfig) -> Result<Vec<Template>> {
    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    let mut pending = vec![dir.as_ref().to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            let matches = match config.template_suffix() {
                Some(suffix) => path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix)),
                None => true,
            };
            if matches {
                let modified = entry
                    .metadata()?
                    .modified()
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                found.push((modified, path));
            }
        }
    }

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.truncate(config.max_templates());

    let templates = found
        .into_iter()
        .map(|(_, path)| Ok(Template { data: fs::read(&path)?, path }))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = templates.len(), "templates loaded");
    Ok(templates)
}
