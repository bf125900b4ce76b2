//! benches/envelope.rs
//! Worst case (full table miss) and best case (first-row hit) envelope search
use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use criterion::{criterion_group, criterion_main, Criterion};
use msgcrypt_rs::decrypt_envelope;
use std::hint::black_box;

const KEY: &str = "000102030405060708090a0b0c0d0e0f";

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    let mut image = vec![0xff, 0xd8, 0xff, 0xe0];
    image.resize(64 * 1024, 0x11);
    let key: Vec<u8> = (0u8..16).collect();
    let hit = Aes128Gcm::new_from_slice(&key)
        .unwrap()
        .encrypt(Nonce::from_slice(&key[..12]), image.as_slice())
        .unwrap();
    let miss: Vec<u8> = (0..64 * 1024u32).map(|i| (i * 13 + 5) as u8).collect();

    group.bench_function("first_row_hit", |b| {
        b.iter(|| black_box(decrypt_envelope(black_box(&hit), KEY).unwrap()));
    });
    group.bench_function("exhausted", |b| {
        b.iter(|| black_box(decrypt_envelope(black_box(&miss), KEY).is_err()));
    });

    group.finish();
}

criterion_group!(benches, bench_envelope);
criterion_main!(benches);
