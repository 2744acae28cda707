//! Object codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynobj_bench::{array_record, nested_record, simple_record, wide_record};
use dynobj_core::{from_bytes, to_bytes, CodecConfig, MemoryContext, ObjectId, Value};

fn contexts() -> [(&'static str, MemoryContext); 2] {
    [
        ("normalized", MemoryContext::new(CodecConfig::new())),
        ("literal", MemoryContext::new(CodecConfig::literal())),
    ]
}

/// Benchmark encoding records.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for (mode, ctx) in contexts() {
        group.bench_function(BenchmarkId::new("simple", mode), |b| {
            let value = Value::Object(simple_record());
            b.iter(|| black_box(to_bytes(&ctx, black_box(&value)).unwrap()));
        });

        group.bench_function(BenchmarkId::new("nested_depth3_width5", mode), |b| {
            let mut record = nested_record(3, 5);
            record.set_object_id(ObjectId::new_random());
            let value = Value::Object(record);
            b.iter(|| black_box(to_bytes(&ctx, black_box(&value)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark encoding by record width.
fn bench_encode_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_width");
    let ctx = MemoryContext::default();

    for width in [4usize, 32, 256].iter() {
        let value = Value::Object(wide_record(*width));
        group.throughput(Throughput::Elements(*width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &value, |b, value| {
            b.iter(|| black_box(to_bytes(&ctx, black_box(value)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark decoding records.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (mode, ctx) in contexts() {
        let simple = to_bytes(&ctx, &Value::Object(simple_record())).unwrap();
        group.throughput(Throughput::Bytes(simple.len() as u64));
        group.bench_function(BenchmarkId::new("simple", mode), |b| {
            b.iter(|| black_box(from_bytes(&ctx, black_box(&simple)).unwrap()));
        });

        let arrays = to_bytes(&ctx, &Value::Object(array_record(256))).unwrap();
        group.throughput(Throughput::Bytes(arrays.len() as u64));
        group.bench_function(BenchmarkId::new("arrays_256", mode), |b| {
            b.iter(|| black_box(from_bytes(&ctx, black_box(&arrays)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark roundtrip (encode + decode).
fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    let ctx = MemoryContext::default();

    group.bench_function("nested_depth2_width8", |b| {
        let mut record = nested_record(2, 8);
        record.set_object_id(ObjectId::new_random());
        let value = Value::Object(record);

        b.iter(|| {
            let encoded = to_bytes(&ctx, black_box(&value)).unwrap();
            black_box(from_bytes(&ctx, &encoded).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_encode_width, bench_decode, bench_roundtrip);

criterion_main!(benches);
