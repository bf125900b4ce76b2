//! benches/keystream.rs
//! ISAAC64 keystream generation and in-place media XOR
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use msgcrypt_rs::{keystream, xor_decrypt, MediaKind};
use std::hint::black_box;

const KEY: &str = "2065249527";

fn bench_keystream(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystream");

    for &size in &[2 * 1024usize, 128 * 1024, 4 * 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, &size| {
            b.iter(|| black_box(keystream(black_box(KEY), size).unwrap()));
        });

        let mut payload = vec![0x5au8; size];
        group.bench_with_input(BenchmarkId::new("xor_image", size), &size, |b, _| {
            b.iter(|| xor_decrypt(KEY, black_box(&mut payload), MediaKind::Image).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_keystream);
criterion_main!(benches);
