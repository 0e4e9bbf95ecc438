use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use textcodecs::cs::compression::bwt::bwt_transform_with_workers;
use textcodecs::{Bwt, CodecKind, Huffman, TextCodec};

fn text_like(size: usize) -> String {
    let text = "The quick brown fox jumps over the lazy dog. \
                Pack my box with five dozen liquor jugs. ";
    text.chars().cycle().take(size).collect()
}

fn random_text(size: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codecs");
    let input = text_like(1_000);
    group.throughput(Throughput::Elements(input.len() as u64));

    for kind in CodecKind::ALL {
        let codec = kind.codec();
        let encoded = codec.encode(&input).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", kind), &input, |b, input| {
            b.iter(|| codec.encode(black_box(input)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decode", kind), &encoded.code, |b, code| {
            b.iter(|| codec.decode(black_box(code)).unwrap())
        });
    }
    group.finish();
}

fn bench_huffman_radix(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_radix");
    let input = random_text(10_000, 17);

    for radix in [2, 4, 10] {
        let codec = Huffman::new(radix).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radix), &input, |b, input| {
            b.iter(|| codec.encode(black_box(input)).unwrap())
        });
    }
    group.finish();
}

fn bench_bwt_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt_workers");
    let block: Vec<char> = text_like(8_192).chars().collect();

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &block, |b, block| {
            b.iter(|| bwt_transform_with_workers(black_box(block), workers))
        });
    }
    group.finish();
}

fn bench_bwt_block_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt_block_size");
    let input = random_text(32_768, 3);

    for block_size in [512, 2_048, 8_192] {
        let codec = Bwt::with_block_size(block_size).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(block_size), &input, |b, input| {
            b.iter(|| codec.encode(black_box(input)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_codecs,
    bench_huffman_radix,
    bench_bwt_workers,
    bench_bwt_block_size
);
criterion_main!(benches);
