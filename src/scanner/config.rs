//! src/scanner/config.rs

use crate::consts::{
    DEFAULT_MAX_TEMPLATES, DEFAULT_RETRY_DELAY_SECS, DEFAULT_SCAN_ATTEMPTS,
    DEFAULT_TEMPLATE_SUFFIX, KEY_CANDIDATE_CHARS, MAX_REGION_SIZE, SCAN_CHUNK_OVERLAP,
    SCAN_CHUNK_SIZE,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Memory-scan and template-discovery tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    chunk_size: usize,
    overlap: usize,
    max_region_size: usize,
    attempts: u32,
    retry_delay_ms: u64,
    template_suffix: Option<String>,
    max_templates: usize,
}

impl ScanConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: SCAN_CHUNK_SIZE,
            overlap: SCAN_CHUNK_OVERLAP,
            max_region_size: MAX_REGION_SIZE,
            attempts: DEFAULT_SCAN_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_SECS * 1000,
            template_suffix: Some(DEFAULT_TEMPLATE_SUFFIX.to_string()),
            max_templates: DEFAULT_MAX_TEMPLATES,
        }
    }

    /// Chunk size per read; never smaller than two UTF-16 candidates.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(KEY_CANDIDATE_CHARS * 4);
        self
    }

    #[must_use]
    pub fn with_max_region_size(mut self, bytes: usize) -> Self {
        self.max_region_size = bytes;
        self
    }

    /// Full passes before giving up (minimum 1).
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Only files whose name ends with `suffix` are templates; `None` accepts all.
    #[must_use]
    pub fn with_template_suffix(mut self, suffix: Option<&str>) -> Self {
        self.template_suffix = suffix.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_max_templates(mut self, count: usize) -> Self {
        self.max_templates = count.max(1);
        self
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    #[must_use]
    pub const fn max_region_size(&self) -> usize {
        self.max_region_size
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn template_suffix(&self) -> Option<&str> {
        self.template_suffix.as_deref()
    }

    #[must_use]
    pub const fn max_templates(&self) -> usize {
        self.max_templates
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}
