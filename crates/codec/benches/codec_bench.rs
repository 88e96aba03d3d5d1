//! Benchmarks for key encoding and decoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlkv_codec::{decode_key, encode_key};
use sqlkv_core::Value;

fn sample_key(i: i64) -> Vec<Value> {
    vec![
        Value::from("orders"),
        Value::Int(i),
        Value::Float(i as f64 * 0.25),
        Value::from(format!("customer-{}", i)),
    ]
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_encode_key");

    for count in [100i64, 1000, 10000].iter() {
        let keys: Vec<_> = (0..*count).map(sample_key).collect();
        group.bench_with_input(BenchmarkId::new("encode", count), &keys, |b, keys| {
            let mut buffer = Vec::with_capacity(64);
            b.iter(|| {
                for key in keys {
                    buffer.clear();
                    encode_key(&mut buffer, black_box(key)).unwrap();
                }
            });
        });
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_decode_key");

    for count in [100i64, 1000, 10000].iter() {
        let encoded: Vec<Vec<u8>> = (0..*count)
            .map(|i| {
                let mut buffer = Vec::new();
                encode_key(&mut buffer, &sample_key(i)).unwrap();
                buffer
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("decode", count), &encoded, |b, encoded| {
            b.iter(|| {
                for bytes in encoded {
                    black_box(decode_key(bytes).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
