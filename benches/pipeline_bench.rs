use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sccrypt::pipeline::{open_frame, seal_frame, CHUNK_SIZE};
use sccrypt::{crypto, ContainerReader, ContainerWriter, Header};
use std::io::Cursor;

fn bench_frames(c: &mut Criterion) {
    let chunk    = vec![0x42u8; CHUNK_SIZE];
    let key      = crypto::derive_key("bench password");
    let fixed_iv = crypto::fixed_iv();
    let mut rng  = StdRng::seed_from_u64(1);

    c.bench_function("seal_frame_4k", |b| {
        b.iter(|| seal_frame(black_box(&chunk), &key, &fixed_iv, &mut rng).unwrap())
    });

    let frame = seal_frame(&chunk, &key, &fixed_iv, &mut rng).unwrap();
    c.bench_function("open_frame_4k", |b| {
        b.iter(|| open_frame(black_box(&frame), 1, &key, &fixed_iv).unwrap())
    });
}

fn bench_container_1mb(c: &mut Criterion) {
    let data     = vec![7u8; 1024 * 1024];
    let key      = crypto::derive_key("bench password");
    let fixed_iv = crypto::fixed_iv();

    c.bench_function("write_container_1mb", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(2);
            let mut w = ContainerWriter::new(Vec::with_capacity(data.len() + 64 * 1024));
            w.write_header(&Header::new(256, b"bench.bin".to_vec(), false)).unwrap();
            for chunk in black_box(&data).chunks(CHUNK_SIZE) {
                w.write_frame(&seal_frame(chunk, &key, &fixed_iv, &mut rng).unwrap()).unwrap();
            }
            w.into_inner()
        })
    });

    let mut rng = StdRng::seed_from_u64(2);
    let mut w = ContainerWriter::new(Vec::new());
    w.write_header(&Header::new(256, b"bench.bin".to_vec(), false)).unwrap();
    for chunk in data.chunks(CHUNK_SIZE) {
        w.write_frame(&seal_frame(chunk, &key, &fixed_iv, &mut rng).unwrap()).unwrap();
    }
    let container = w.into_inner();

    c.bench_function("read_container_1mb", |b| {
        b.iter(|| {
            let mut r = ContainerReader::new(Cursor::new(black_box(&container)));
            r.read_header().unwrap();
            let mut out = 0usize;
            while let Some(frame) = r.read_frame().unwrap() {
                out += open_frame(&frame, r.frames_read(), &key, &fixed_iv).unwrap().len();
            }
            out
        })
    });
}

criterion_group!(benches, bench_frames, bench_container_1mb);
criterion_main!(benches);
