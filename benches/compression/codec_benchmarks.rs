use compresso::compression::{compress_frame, huffman, lzw, Frame, FrameCodecConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn text_like(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(1);
    let words: [&[u8]; 8] = [
        b"the ", b"quick ", b"brown ", b"fox ", b"jumps ", b"over ", b"lazy ", b"dog ",
    ];
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        out.extend_from_slice(words[rng.gen_range(0..words.len())]);
    }
    out.truncate(len);
    out
}

fn bench_huffman(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman");
    for size in [1_000, 10_000, 100_000] {
        let data = text_like(size);
        let artifact = huffman::compress(&data).unwrap();
        group.bench_with_input(BenchmarkId::new("compress", size), &data, |b, data| {
            b.iter(|| huffman::compress(black_box(data)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decompress", size), &artifact, |b, a| {
            b.iter(|| huffman::decompress::<u8>(black_box(a)).unwrap())
        });
    }
    group.finish();
}

fn bench_lzw(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzw");
    for size in [1_000, 10_000, 100_000] {
        let data = text_like(size);
        let artifact = lzw::compress(&data).unwrap();
        group.bench_with_input(BenchmarkId::new("compress", size), &data, |b, data| {
            b.iter(|| lzw::compress(black_box(data)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decompress", size), &artifact, |b, a| {
            b.iter(|| lzw::decompress(black_box(a)).unwrap())
        });
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let (width, height) = (320, 240);
    let data = (0..width * height * 3).map(|_| rng.gen::<u8>()).collect();
    let frame = Frame::new(width, height, 3, data).unwrap();
    let config = FrameCodecConfig::default();
    c.bench_function("dct_frame_320x240", |b| {
        b.iter(|| compress_frame(black_box(&frame), &config).unwrap())
    });
}

criterion_group!(benches, bench_huffman, bench_lzw, bench_frame);
criterion_main!(benches);
