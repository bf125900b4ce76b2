//! src/page/options.rs
//! Page cipher configuration builder

use crate::consts::{
    BLOCK_SIZE, DEFAULT_KDF_ITERATIONS, DEFAULT_PAGE_SIZE, DEFAULT_PROGRESS_INTERVAL,
    RESERVE_SIZE, SALT_SIZE,
};
use crate::error::{RecoveryError, Result};
use serde::{Deserialize, Serialize};

/// Tunables for [`crate::page::decrypt_database_with`].
///
/// Defaults match the target client: 4096-byte pages, 256,000 PBKDF2 rounds,
/// a progress callback (and cooperative yield) every 100 pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageCipherOptions {
    page_size: usize,
    kdf_iterations: u32,
    progress_interval: u32,
}

impl PageCipherOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the encryption-key PBKDF2 round count (minimum 1).
    #[must_use]
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations.max(1);
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, pages: u32) -> Self {
        self.progress_interval = pages.max(1);
        self
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn kdf_iterations(&self) -> u32 {
        self.kdf_iterations
    }

    #[must_use]
    pub const fn progress_interval(&self) -> u32 {
        self.progress_interval
    }

    /// End of the encrypted body / start of the reserve region.
    #[must_use]
    pub const fn body_end(&self) -> usize {
        self.page_size - RESERVE_SIZE
    }

    /// Reject geometries that cannot hold salt + one block + reserve.
    pub fn validate(&self) -> Result<()> {
        if self.page_size % BLOCK_SIZE != 0 || self.page_size < SALT_SIZE + BLOCK_SIZE + RESERVE_SIZE
        {
            return Err(RecoveryError::Format(format!(
                "unsupported page size {}",
                self.page_size
            )));
        }
        Ok(())
    }
}

impl Default for PageCipherOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = PageCipherOptions::default();
        assert_eq!(opts.page_size(), 4096);
        assert_eq!(opts.kdf_iterations(), 256_000);
        assert_eq!(opts.progress_interval(), 100);
        assert_eq!(opts.body_end(), 4096 - 80);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn builder_clamps_and_validates() {
        let opts = PageCipherOptions::new()
            .with_kdf_iterations(0)
            .with_progress_interval(0);
        assert_eq!(opts.kdf_iterations(), 1);
        assert_eq!(opts.progress_interval(), 1);

        assert!(PageCipherOptions::new().with_page_size(1000).validate().is_err());
        assert!(PageCipherOptions::new().with_page_size(64).validate().is_err());
        assert!(PageCipherOptions::new().with_page_size(1024).validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let opts: PageCipherOptions = serde_json::from_str(r#"{"kdf_iterations": 64000}"#).unwrap();
        assert_eq!(opts.kdf_iterations(), 64_000);
        assert_eq!(opts.page_size(), 4096);
    }
}
