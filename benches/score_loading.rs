//! Score file loading benchmark
//!
//! Covers the reload path on synthetic files of increasing size:
//!
//! 1. `codec::decode` - parse the byte stream into records
//! 2. `DatasetStore::build` + normalized thresholds + classification
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench score_loading
//! ```

use compile_score::category::{DISPLAY_COUNT, GATHER_COUNT};
use compile_score::codec::{decode, SCORE_VERSION};
use compile_score::dataset::{DatasetStore, NormalizationScope};
use compile_score::severity::classify_store;
use compile_score::threshold::{apply_normalized, ThresholdPolicy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;

fn put_string(out: &mut Vec<u8>, s: &str) {
    let mut size = s.len();
    loop {
        let byte = (size & 0x7F) as u8;
        size >>= 7;
        if size == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.extend_from_slice(s.as_bytes());
}

/// Score file with `units` units and `per_category` entries in every gathered category
fn synthetic_score_file(units: usize, per_category: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&SCORE_VERSION.to_le_bytes());

    out.extend_from_slice(&(units as u32).to_le_bytes());
    for i in 0..units {
        put_string(&mut out, &format!("src/module_{}/file_{}.cpp", i % 37, i));
        for c in 0..DISPLAY_COUNT {
            out.extend_from_slice(&((i * 131 + c * 17) as u32).to_le_bytes());
        }
    }

    for c in 0..GATHER_COUNT {
        out.extend_from_slice(&(per_category as u32).to_le_bytes());
        for i in 0..per_category {
            let max = ((i * 7919 + c * 104_729) % 2_000_000) as u32;
            put_string(&mut out, &format!("lib/dir_{}/header_{}_{}.h", i % 53, c, i));
            out.extend_from_slice(&(u64::from(max) * 3).to_le_bytes());
            out.extend_from_slice(&(max / 4).to_le_bytes());
            out.extend_from_slice(&max.to_le_bytes());
            out.extend_from_slice(&3u32.to_le_bytes());
        }
    }
    out
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for per_category in [100, 1_000, 10_000] {
        let bytes = synthetic_score_file(per_category / 10, per_category);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(per_category),
            &bytes,
            |b, bytes| b.iter(|| decode(Cursor::new(black_box(bytes.as_slice()))).unwrap()),
        );
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let scope = NormalizationScope::all_gathered();

    for per_category in [1_000, 10_000] {
        let data = decode(Cursor::new(synthetic_score_file(0, per_category))).unwrap();
        group.throughput(Throughput::Elements((per_category * GATHER_COUNT) as u64));

        group.bench_with_input(
            BenchmarkId::new("normalized", per_category),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut store = DatasetStore::build(data.clone());
                    apply_normalized(&mut store, &scope);
                    classify_store(&mut store, &ThresholdPolicy::Normalized);
                    black_box(store)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("user_defined", per_category),
            &data,
            |b, data| {
                let policy =
                    ThresholdPolicy::UserDefined(vec![1_000, 10_000, 50_000, 250_000, 1_000_000]);
                b.iter(|| {
                    let mut store = DatasetStore::build(data.clone());
                    classify_store(&mut store, &policy);
                    black_box(store)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_classify);
criterion_main!(benches);
