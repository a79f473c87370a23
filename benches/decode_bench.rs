//! Criterion benchmarks for wirebound
//!
//! Run with: cargo bench

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wirebound::{
    decode_frame, plan_for, Decoder, FieldDescriptor, FieldKind, Record, RecordDescriptor, Value,
    VersionTag,
};

#[derive(Debug, Default)]
struct BenchPartition {
    partition: i32,
    fetch_offset: i64,
    max_bytes: i32,
}

impl Value for BenchPartition {
    fn field_mut(&mut self, index: usize) -> &mut dyn Value {
        match index {
            0 => &mut self.partition,
            1 => &mut self.fetch_offset,
            2 => &mut self.max_bytes,
            _ => panic!("BenchPartition has no field {index}"),
        }
    }
}

static BENCH_PARTITION: RecordDescriptor = RecordDescriptor {
    name: "BenchPartition",
    self_decoding: false,
    fields: &[
        FieldDescriptor {
            name: "partition",
            kind: FieldKind::Int32,
            tags: &[VersionTag::new(0, i16::MAX)],
        },
        FieldDescriptor {
            name: "fetch_offset",
            kind: FieldKind::Int64,
            tags: &[VersionTag::new(0, i16::MAX)],
        },
        FieldDescriptor {
            name: "max_bytes",
            kind: FieldKind::Int32,
            tags: &[VersionTag::new(0, i16::MAX)],
        },
    ],
};

impl Record for BenchPartition {
    fn descriptor() -> &'static RecordDescriptor {
        &BENCH_PARTITION
    }
}

#[derive(Debug, Default)]
struct BenchRequest {
    replica_id: i32,
    topic: String,
    partitions: Vec<BenchPartition>,
}

impl Value for BenchRequest {
    fn field_mut(&mut self, index: usize) -> &mut dyn Value {
        match index {
            0 => &mut self.replica_id,
            1 => &mut self.topic,
            2 => &mut self.partitions,
            _ => panic!("BenchRequest has no field {index}"),
        }
    }
}

static BENCH_REQUEST: RecordDescriptor = RecordDescriptor {
    name: "BenchRequest",
    self_decoding: false,
    fields: &[
        FieldDescriptor {
            name: "replica_id",
            kind: FieldKind::Int32,
            tags: &[VersionTag::new(0, i16::MAX)],
        },
        FieldDescriptor {
            name: "topic",
            kind: FieldKind::String,
            tags: &[VersionTag::new(0, i16::MAX)],
        },
        FieldDescriptor {
            name: "partitions",
            kind: FieldKind::Array(&FieldKind::Record(&BENCH_PARTITION)),
            tags: &[VersionTag::new(0, i16::MAX)],
        },
    ],
};

impl Record for BenchRequest {
    fn descriptor() -> &'static RecordDescriptor {
        &BENCH_REQUEST
    }
}

/// Hand-built frame: replica_id, topic, 8 partitions.
fn build_frame() -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&(-1i32).to_be_bytes());
    frame.extend_from_slice(&(4i16).to_be_bytes());
    frame.extend_from_slice(b"logs");
    frame.extend_from_slice(&(8i32).to_be_bytes());
    for partition in 0..8i32 {
        frame.extend_from_slice(&partition.to_be_bytes());
        frame.extend_from_slice(&(1_048_576i64).to_be_bytes());
        frame.extend_from_slice(&(65_536i32).to_be_bytes());
    }
    frame
}

fn bench_decode_frame(c: &mut Criterion) {
    let frame = build_frame();

    c.bench_function("decode_request_8_partitions", |b| {
        b.iter(|| {
            let mut source = Cursor::new(black_box(&frame[..]));
            let request: BenchRequest =
                decode_frame(&mut source, frame.len(), 0).unwrap();
            black_box(request);
        });
    });
}

fn bench_plan_lookup(c: &mut Criterion) {
    // Prime the cache once; the benchmark measures the hit path
    let _ = plan_for(&BENCH_REQUEST, 0);

    c.bench_function("plan_cache_hit", |b| {
        b.iter(|| {
            let plan = plan_for(black_box(&BENCH_REQUEST), black_box(0));
            black_box(plan);
        });
    });
}

fn bench_primitive_reads(c: &mut Criterion) {
    let data = vec![0x42u8; 8 * 1024];

    c.bench_function("read_i64_stream", |b| {
        b.iter(|| {
            let mut source = &data[..];
            let mut decoder = Decoder::new(&mut source, data.len());
            let mut acc = 0i64;
            for _ in 0..(data.len() / 8) {
                acc = acc.wrapping_add(decoder.read_i64());
            }
            decoder.finish().unwrap();
            black_box(acc);
        });
    });
}

criterion_group!(
    benches,
    bench_decode_frame,
    bench_plan_lookup,
    bench_primitive_reads
);
criterion_main!(benches);
