//! tests/scanner_tests.rs
//! Key scanning over synthetic memory images

mod common;
use common::{init_tracing, jpeg_sample_for};

use msgcrypt_rs::consts::{DAT_V2_SIGNATURE, SAMPLE_OFFSET};
use msgcrypt_rs::scanner::{
    load_templates, recover_keys_with, scan_for_key, scan_reader, CiphertextSample, KeyShape,
    MemorySnapshot, ScanConfig,
};
use msgcrypt_rs::RecoveryError;
use std::cell::Cell;
use std::time::Duration;
use tempfile::TempDir;

const KEY32: &[u8; 32] = b"K7mQ2xR9pL4vN8sT1wY6zB3cF5hJ0dGa";
const DECOY: &[u8; 32] = b"zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";
const BASE: usize = 0x7f00_0000;

fn aes_key() -> [u8; 16] {
    KEY32[..16].try_into().unwrap()
}

fn sample() -> CiphertextSample {
    CiphertextSample::new(jpeg_sample_for(&aes_key()))
}

fn fast_config() -> ScanConfig {
    ScanConfig::new().with_retry_delay(Duration::ZERO)
}

fn image_with(at: usize, needle: &[u8], len: usize) -> Vec<u8> {
    let mut mem = vec![0xccu8; len];
    mem[at..at + needle.len()].copy_from_slice(needle);
    mem
}

fn wide(s: &[u8]) -> Vec<u8> {
    s.iter().flat_map(|&b| [b, 0]).collect()
}

#[test]
fn finds_ascii_key_at_known_offset() {
    let mut mem = image_with(4321, KEY32, 10_000);
    mem[200..232].copy_from_slice(DECOY);
    let snapshot = MemorySnapshot::new().with_region(BASE, mem);

    let found = scan_reader(&snapshot, &sample(), &fast_config())
        .unwrap()
        .unwrap();
    assert_eq!(found.key, aes_key());
    assert_eq!(found.shape, KeyShape::Ascii);
    assert_eq!(found.address, BASE + 4321);
    assert_eq!(found.key_string(), "K7mQ2xR9pL4vN8sT");
}

#[test]
fn finds_key_straddling_chunk_boundary() {
    let config = fast_config().with_chunk_size(128);
    let snapshot = MemorySnapshot::new().with_region(BASE, image_with(110, KEY32, 1000));

    let found = scan_reader(&snapshot, &sample(), &config).unwrap().unwrap();
    assert_eq!(found.address, BASE + 110);
}

#[test]
fn finds_utf16_key_across_chunk_boundaries() {
    let config = fast_config().with_chunk_size(128);
    // 62: terminator ends exactly at the first boundary
    // 63, 64: terminator in the next chunk, key found through the carry
    // 191: same at the second boundary
    for at in [60usize, 62, 63, 64, 100, 127, 128, 191] {
        let snapshot = MemorySnapshot::new().with_region(BASE, image_with(at, &wide(KEY32), 1000));

        let found = scan_reader(&snapshot, &sample(), &config)
            .unwrap()
            .unwrap_or_else(|| panic!("no key at offset {at}"));
        assert_eq!(found.key, aes_key(), "offset {at}");
        assert_eq!(found.shape, KeyShape::Utf16Le, "offset {at}");
        assert_eq!(found.address, BASE + at, "offset {at}");
    }
}

#[test]
fn finds_utf16_key() {
    let snapshot = MemorySnapshot::new().with_region(BASE, image_with(1000, &wide(KEY32), 4000));

    let found = scan_reader(&snapshot, &sample(), &fast_config())
        .unwrap()
        .unwrap();
    assert_eq!(found.key, aes_key());
    assert_eq!(found.shape, KeyShape::Utf16Le);
}

#[test]
fn oversized_regions_are_skipped() {
    let config = fast_config().with_max_region_size(1024);
    let snapshot = MemorySnapshot::new().with_region(BASE, image_with(10, KEY32, 4096));
    assert!(scan_reader(&snapshot, &sample(), &config).unwrap().is_none());
}

#[test]
fn retries_with_fresh_reader() {
    init_tracing();
    let opens = Cell::new(0u32);
    let snapshot = MemorySnapshot::new().with_region(BASE, image_with(64, KEY32, 512));

    let found = scan_for_key(
        || {
            opens.set(opens.get() + 1);
            if opens.get() == 1 {
                Err(RecoveryError::ProcessAccess { pid: 42, reason: "busy".into() })
            } else {
                Ok(snapshot.clone())
            }
        },
        &sample(),
        &fast_config(),
    )
    .unwrap();

    assert_eq!(found.key, aes_key());
    assert_eq!(opens.get(), 2);
}

#[test]
fn exhausted_attempts_are_not_found() {
    let opens = Cell::new(0u32);
    let empty = MemorySnapshot::new().with_region(BASE, vec![0xccu8; 512]);

    let err = scan_for_key(
        || {
            opens.set(opens.get() + 1);
            Ok(empty.clone())
        },
        &sample(),
        &fast_config(),
    )
    .unwrap_err();

    assert!(matches!(err, RecoveryError::NotFound(_)));
    assert_eq!(opens.get(), 3);
}

#[test]
fn final_open_failure_is_returned() {
    let err = scan_for_key(
        || -> msgcrypt_rs::Result<MemorySnapshot> {
            Err(RecoveryError::ProcessAccess { pid: 7, reason: "denied".into() })
        },
        &sample(),
        &fast_config().with_attempts(2),
    )
    .unwrap_err();
    assert!(matches!(err, RecoveryError::ProcessAccess { pid: 7, .. }));
}

fn template(xor: u8, v2_sample: Option<[u8; 16]>) -> Vec<u8> {
    let mut data = match v2_sample {
        Some(block) => {
            let mut d = DAT_V2_SIGNATURE.to_vec();
            d.resize(SAMPLE_OFFSET, 0);
            d.extend_from_slice(&block);
            d
        }
        None => vec![0x10; 40],
    };
    data.extend_from_slice(&[0x55, 0xff ^ xor, 0xd9 ^ xor]);
    data
}

#[test]
fn recovers_both_keys_from_templates_and_memory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("2024-05");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(nested.join("a_t.dat"), template(0x37, Some(jpeg_sample_for(&aes_key())))).unwrap();
    std::fs::write(dir.path().join("b_t.dat"), template(0x37, None)).unwrap();
    std::fs::write(dir.path().join("c.dat"), template(0x99, None)).unwrap();

    let snapshot = MemorySnapshot::new().with_region(BASE, image_with(300, KEY32, 2048));
    let outcome = recover_keys_with(dir.path(), &fast_config(), || Ok(snapshot.clone())).unwrap();

    assert_eq!(outcome.xor_key, 0x37);
    assert_eq!(outcome.aes_key.as_deref(), Some("K7mQ2xR9pL4vN8sT"));

    let json = serde_json::to_string(&outcome).unwrap();
    assert!(json.contains("\"xor_key\":55"));
}

#[test]
fn no_v2_template_means_no_aes_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a_t.dat"), template(0x12, None)).unwrap();

    let outcome = recover_keys_with(dir.path(), &fast_config(), || -> msgcrypt_rs::Result<MemorySnapshot> {
        panic!("memory must not be scanned without a sample")
    })
    .unwrap();
    assert_eq!(outcome.xor_key, 0x12);
    assert!(outcome.aes_key.is_none());
}

#[test]
fn template_discovery_filters_and_caps() {
    let dir = TempDir::new().unwrap();
    for name in ["1_t.dat", "2_t.dat", "3_t.dat", "other.dat"] {
        std::fs::write(dir.path().join(name), template(1, None)).unwrap();
    }

    assert_eq!(load_templates(dir.path(), &ScanConfig::new()).unwrap().len(), 3);
    let capped = ScanConfig::new().with_max_templates(2);
    assert_eq!(load_templates(dir.path(), &capped).unwrap().len(), 2);
    let all = ScanConfig::new().with_template_suffix(None);
    assert_eq!(load_templates(dir.path(), &all).unwrap().len(), 4);
}
