// src/batch_ops.rs

#[cfg(feature = "batch-ops")]
use rayon::prelude::*;
#[cfg(feature = "batch-ops")]
use std::path::PathBuf;

#[cfg(feature = "batch-ops")]
use crate::page::{decrypt_database_with, DecryptReport, PageCipherOptions};
#[cfg(feature = "batch-ops")]
use crate::Result;

/// Decrypt independent databases in parallel, one `(input, output)` pair per job.
///
/// Reports come back in job order. The first error is returned; jobs already
/// running on other threads still finish.
#[cfg(feature = "batch-ops")]
pub fn decrypt_batch(
    jobs: &[(PathBuf, PathBuf)],
    raw_key_hex: &str,
    options: &PageCipherOptions,
) -> Result<Vec<DecryptReport>> {
    jobs.par_iter()
        .map(|(input, output)| decrypt_database_with(input, output, raw_key_hex, options, |_| {}))
        .collect()
}
