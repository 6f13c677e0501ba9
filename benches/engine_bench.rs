//! Benchmarks for MirrorKV codec and local engine operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mirrorkv::protocol::{decode_message, encode_message, Message};
use mirrorkv::storage::MemoryStorage;
use mirrorkv::Engine;

fn codec_benchmarks(c: &mut Criterion) {
    let msg = Message::Put {
        id: 7,
        key: vec![0xAB; 16],
        value: vec![0xCD; 256],
    };

    c.bench_function("encode_put_frame", |b| {
        b.iter(|| encode_message(black_box(&msg)))
    });

    let encoded = encode_message(&msg);
    c.bench_function("decode_put_frame", |b| {
        b.iter(|| decode_message(black_box(&encoded)).unwrap())
    });
}

fn engine_benchmarks(c: &mut Criterion) {
    let engine = Engine::new(Box::new(MemoryStorage::new()));

    let put = Message::Put {
        id: 1,
        key: b"bench-key".to_vec(),
        value: vec![0u8; 128],
    };
    c.bench_function("engine_put_local", |b| {
        b.iter(|| engine.process_message(black_box(&put)).unwrap())
    });

    engine.process_message(&put).unwrap();
    let get = Message::Get {
        id: 2,
        key: b"bench-key".to_vec(),
    };
    c.bench_function("engine_get_local", |b| {
        b.iter(|| engine.process_message(black_box(&get)).unwrap())
    });
}

criterion_group!(benches, codec_benchmarks, engine_benchmarks);
criterion_main!(benches);
