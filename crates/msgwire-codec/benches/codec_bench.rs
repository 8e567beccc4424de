//! Codec benchmarks for msgwire.
//!
//! Benchmarks encode and decode of both frame variants at several body sizes.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use msgwire_codec::{encode_big, encode_small, FrameCodec};

/// Generate test data of specified size
fn generate_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn bench_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_frame");
    let codec = FrameCodec::default();

    // Bodies up to the default cap
    for size in [0usize, 64, 512, 1_016].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        let data = generate_data(*size);

        group.bench_with_input(BenchmarkId::new("encode", size), size, |b, _| {
            b.iter(|| black_box(encode_small(7, &data)));
        });

        let encoded: Bytes = encode_small(7, &data);
        group.bench_with_input(BenchmarkId::new("decode", size), size, |b, _| {
            b.iter(|| black_box(codec.decode_small(encoded.clone()).unwrap()));
        });
    }

    group.finish();
}

fn bench_big(c: &mut Criterion) {
    let mut group = c.benchmark_group("big_frame");
    let codec = FrameCodec::default();

    for size in [1_024usize, 65_536, 1_048_576].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        let data = generate_data(*size);

        group.bench_with_input(BenchmarkId::new("encode", size), size, |b, _| {
            b.iter(|| black_box(encode_big(&data)));
        });

        let encoded = encode_big(&data);
        group.bench_with_input(BenchmarkId::new("decode", size), size, |b, _| {
            b.iter(|| black_box(codec.decode_big(encoded.clone()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_small, bench_big);
criterion_main!(benches);
