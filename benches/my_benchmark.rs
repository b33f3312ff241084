#![allow(missing_docs)]
use aplib::bit_decode::TagReader;
use aplib::utils::{pack, random_payload, StreamBuilder};
use aplib::{decompress, Decompressor};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn aplib_decode(c: &mut Criterion) {
    let n = 100_000;
    let seed = 23;

    // small alphabet: mostly short blocks and single bytes
    let data = random_payload(n, 4, seed);
    let packed = pack(&data).unwrap();
    c.bench_function(&format!("Decode: 4-symbol payload - {} bytes", n), |b| {
        b.iter(|| decompress(black_box(&packed)).unwrap())
    });

    // incompressible: literals only
    let data = random_payload(n, 256, seed);
    let packed = pack(&data).unwrap();
    c.bench_function(&format!("Decode: random payload - {} bytes", n), |b| {
        b.iter(|| decompress(black_box(&packed)).unwrap())
    });

    // one long run: a single overlapping block
    let data = vec![0x41_u8; n];
    let packed = pack(&data).unwrap();
    c.bench_function(&format!("Decode: single run - {} bytes", n), |b| {
        b.iter(|| {
            Decompressor::new(black_box(packed.as_slice()))
                .decode()
                .unwrap()
        })
    });
}

fn variable_numbers(c: &mut Criterion) {
    // one block with an encoded offset, then 10_000 blocks reusing it with growing lengths
    let mut s = StreamBuilder::new(0);
    s.literal(1);
    s.block(1, 4).unwrap();
    s.literal(1);
    for length in 2..10_002 {
        s.block(1, length).unwrap();
        s.literal(1);
    }
    let stream = s.finish();

    c.bench_function("TagReader: variable numbers", |b| {
        b.iter(|| {
            let mut r = TagReader::new(black_box(stream.as_slice()));
            r.read_byte().unwrap();
            // literal, block(1, 4), literal
            r.read_unary_count(3, true).unwrap();
            r.read_byte().unwrap();
            r.read_unary_count(3, true).unwrap();
            let mut total = r.read_variable_number().unwrap();
            r.read_byte().unwrap();
            total += r.read_variable_number().unwrap();
            r.read_unary_count(3, true).unwrap();
            r.read_byte().unwrap();
            // (block: reuse code + length, literal) pairs
            for _ in 0..10_000 {
                r.read_unary_count(3, true).unwrap();
                total += r.read_variable_number().unwrap();
                total += r.read_variable_number().unwrap();
                r.read_unary_count(3, true).unwrap();
                r.read_byte().unwrap();
            }
            total
        })
    });
}

fn aplib_pack(c: &mut Criterion) {
    let n = 20_000;
    let data = random_payload(n, 4, 42);
    c.bench_function(&format!("Pack (naive): 4-symbol payload - {} bytes", n), |b| {
        b.iter(|| pack(black_box(&data)).unwrap())
    });
}

criterion_group!(benches, aplib_decode, variable_numbers, aplib_pack);
criterion_main!(benches);
