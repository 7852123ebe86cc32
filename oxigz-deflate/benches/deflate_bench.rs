//! Compression throughput benchmarks across levels and data shapes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oxigz_deflate::{deflate, gzip_compress};
use std::hint::black_box;

fn random_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed = 12345u32;
    for _ in 0..size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((seed >> 16) as u8);
    }
    data
}

fn text_data(size: usize) -> Vec<u8> {
    let words: &[&[u8]] = &[
        b"the", b"quick", b"brown", b"fox", b"jumps", b"over", b"lazy", b"dog", b"and", b"runs",
        b"through", b"forest", b"near", b"river", b"under", b"blue", b"sky", b"with", b"wind",
    ];
    let mut data = Vec::with_capacity(size);
    let mut seed = 42u32;
    while data.len() < size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.extend_from_slice(words[(seed as usize) % words.len()]);
        data.push(b' ');
    }
    data.truncate(size);
    data
}

fn repeated_data(size: usize) -> Vec<u8> {
    let pattern = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

fn bench_levels(c: &mut Criterion) {
    let data = text_data(256 * 1024);
    let mut group = c.benchmark_group("deflate_levels");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for level in [4u8, 6, 9] {
        group.bench_with_input(BenchmarkId::from_parameter(level), &data, |b, data| {
            b.iter(|| deflate(black_box(data), level).unwrap());
        });
    }
    group.finish();
}

fn bench_data_shapes(c: &mut Criterion) {
    let cases = [
        ("random", random_data(256 * 1024)),
        ("text", text_data(256 * 1024)),
        ("repeated", repeated_data(256 * 1024)),
    ];
    let mut group = c.benchmark_group("gzip_shapes");
    for (name, data) in &cases {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), data, |b, data| {
            b.iter(|| gzip_compress(black_box(data), 6).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_levels, bench_data_shapes);
criterion_main!(benches);
