// src/scanner/mod.rs

//! Process memory key scanner.
//!
//! Core API: `recover_keys(pid, template_dir, &config)?` derives the media XOR
//! byte from template files and sweeps the target's memory for the runtime
//! AES-128 key, verifying every candidate by trial decryption.
//!
//! The sweep itself ([`scan_reader`], [`scan_for_key`]) is written once
//! against [`MemoryReader`]; [`ProcessMemory`] supplies the per-OS reader and
//! [`MemorySnapshot`] an in-memory one for dumps.

pub(crate) mod config;
pub(crate) mod pattern;
pub(crate) mod process;
pub(crate) mod region;
pub(crate) mod scan;
pub(crate) mod template;

pub use config::ScanConfig;
pub use pattern::{find_candidates, verify_candidate, KeyCandidate, KeyShape};
pub use process::ProcessMemory;
pub use region::{MemoryReader, MemoryRegion, MemorySnapshot, RegionKind};
pub use scan::{recover_keys, recover_keys_with, scan_for_key, scan_reader, ScanOutcome};
pub use template::{
    derive_xor_key, find_ciphertext_sample, load_templates, CiphertextSample, Template,
};
