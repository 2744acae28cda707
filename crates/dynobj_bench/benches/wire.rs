//! Primitive codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynobj_wire::{BinaryReader, BinaryWriter};

/// Benchmark variable-length integers.
fn bench_varints(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");
    let values: Vec<i64> = (0..1_000).map(|i| (i * 7_919) - 3_000_000).collect();
    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_function("write_signed_1000", |b| {
        b.iter(|| {
            let mut writer = BinaryWriter::with_capacity(4_096);
            for value in &values {
                writer.write_var_i64(black_box(*value));
            }
            black_box(writer.into_bytes());
        });
    });

    let mut writer = BinaryWriter::new();
    for value in &values {
        writer.write_var_i64(*value);
    }
    let encoded = writer.into_bytes();

    group.bench_function("read_signed_1000", |b| {
        b.iter(|| {
            let mut reader = BinaryReader::new(black_box(&encoded));
            for _ in 0..values.len() {
                black_box(reader.read_var_i64().unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmark bit packing of tags and booleans.
fn bench_bits(c: &mut Criterion) {
    let mut group = c.benchmark_group("bits");

    for count in [64usize, 4_096].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("tag_and_bit", count), count, |b, &count| {
            b.iter(|| {
                let mut writer = BinaryWriter::new();
                for i in 0..count {
                    writer.write_bits((i % 32) as u32, 6);
                    writer.write_bit(i % 2 == 0);
                }
                black_box(writer.into_bytes());
            });
        });
    }

    group.finish();
}

/// Benchmark strings.
fn bench_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("string");

    for size in [16usize, 1_024].iter() {
        let text = "x".repeat(*size);
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("roundtrip", size), &text, |b, text| {
            b.iter(|| {
                let mut writer = BinaryWriter::new();
                writer.write_str(black_box(text));
                let bytes = writer.into_bytes();
                let mut reader = BinaryReader::new(&bytes);
                black_box(reader.read_string().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_varints, bench_bits, bench_strings);

criterion_main!(benches);
