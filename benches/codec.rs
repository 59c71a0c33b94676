use std::io::{Cursor, sink};

use datalocker::{EngineConfig, derive_key, decrypt_stream, encrypt_stream, secretcrypt};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(sample_count = 10)]
fn bench_derive_key(bencher: divan::Bencher) {
    let salt = [0x42u8; 32];
    bencher.bench(|| derive_key(divan::black_box(b"benchmark password"), &salt).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576], sample_count = 10)]
fn bench_buffer_encrypt(bencher: divan::Bencher, size: usize) {
    let config = EngineConfig::default();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| secretcrypt::encrypt(b"pw", divan::black_box(&data), &config).unwrap());
}

#[divan::bench(args = [1048576, 8388608], sample_count = 10)]
fn bench_stream_encrypt(bencher: divan::Bencher, size: usize) {
    let config = EngineConfig::default();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt_stream(
                &mut Cursor::new(divan::black_box(&data)),
                &mut sink(),
                b"pw",
                &config,
            )
            .unwrap()
        });
}

#[divan::bench(args = [1048576, 8388608], sample_count = 10)]
fn bench_stream_decrypt(bencher: divan::Bencher, size: usize) {
    let config = EngineConfig::default();
    let mut framed = Vec::new();
    encrypt_stream(&mut Cursor::new(make_data(size)), &mut framed, b"pw", &config).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            decrypt_stream(
                &mut Cursor::new(divan::black_box(&framed)),
                &mut sink(),
                b"pw",
                &config,
            )
            .unwrap()
        });
}

fn main() {
    divan::main();
}
