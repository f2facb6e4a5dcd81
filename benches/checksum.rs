// benches/checksum.rs
//! CRC-64, CRC-32 and digest throughput, plus CRC-64 combine cost.

use envelope_crypt::checksum::{Crc32Checksum, DigestAlgorithm, DigestChecksum};
use envelope_crypt::{Checksum, Crc64};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

const MB: usize = 1024 * 1024;

fn bench_checksums(c: &mut Criterion) {
    let data = vec![0xA5u8; MB];
    let mut group = c.benchmark_group("checksum");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("crc64", |b| {
        b.iter(|| black_box(Crc64::checksum(black_box(&data))));
    });

    group.bench_function("crc32", |b| {
        b.iter(|| {
            let mut crc = Crc32Checksum::new();
            crc.update(black_box(&data));
            black_box(crc.get())
        });
    });

    for alg in [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sm3,
        DigestAlgorithm::Blake3,
    ] {
        group.bench_with_input(BenchmarkId::new("digest", alg), &alg, |b, &alg| {
            b.iter(|| {
                let mut digest = DigestChecksum::new(alg);
                digest.update(black_box(&data));
                black_box(digest.value())
            });
        });
    }

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc64-combine");
    for len_b in [1u64, 4096, 1 << 20, 1 << 40] {
        group.bench_with_input(BenchmarkId::new("len_b", len_b), &len_b, |b, &len_b| {
            b.iter(|| black_box(Crc64::combine(0x1234_5678, 0x9ABC_DEF0, black_box(len_b))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_checksums, bench_combine);
criterion_main!(benches);
