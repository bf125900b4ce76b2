//! benches/kdf.rs
//! Page-cipher key schedule: PBKDF2-HMAC-SHA512 at several round counts
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use msgcrypt_rs::aliases::{Aes256Key32, Salt16};
use msgcrypt_rs::derive_secure_pbkdf2_key;
use msgcrypt_rs::page::derive_keys;
use std::hint::black_box;
use std::time::Duration;

fn kdf_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("KDF");
    // high round counts are slow; keep the run short
    group.measurement_time(Duration::from_secs(8));
    group.sample_size(20);

    let raw_key = Aes256Key32::new([0x42; 32]);
    let salt = Salt16::new([0x24; 16]);

    for &iters in &[1_000, 10_000, 64_000, 256_000] {
        let id = BenchmarkId::new("pbkdf2_iterations", iters);
        group.bench_with_input(id, &iters, |b, &iters| {
            b.iter(|| {
                let mut key = Aes256Key32::new([0u8; 32]);
                derive_secure_pbkdf2_key(
                    black_box(raw_key.expose_secret()),
                    black_box(salt.expose_secret()),
                    iters,
                    &mut key,
                )
                .unwrap();
                black_box(key);
            });
        });
    }

    // full per-file schedule: enc key plus the 2-round MAC key
    group.bench_function("derive_keys_256000", |b| {
        b.iter(|| black_box(derive_keys(black_box(&raw_key), black_box(&salt), 256_000).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, kdf_benches);
criterion_main!(benches);
