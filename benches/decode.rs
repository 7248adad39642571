//! Benchmarks for the position and frame series decoders.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

use pointstat::{
    decode::{FrameSeriesDecoder, PositionDecoder},
    export::serialize,
};

fn synthetic_points(num_points: usize, rng: &mut StdRng) -> String {
    let mut text = String::with_capacity(num_points * 24);
    for _ in 0..num_points {
        let x: f32 = rng.gen_range(-100.0..100.0);
        let y: f32 = rng.gen_range(-100.0..100.0);
        let z: f32 = rng.gen_range(-100.0..100.0);
        text.push_str(&format!("{x},{y},{z}\n"));
    }
    text
}

fn synthetic_frames(num_points: usize, frames: usize, rng: &mut StdRng) -> String {
    let mut text = String::with_capacity(num_points * frames * 6);
    for _ in 0..num_points {
        for f in 0..frames {
            if f > 0 {
                text.push(',');
            }
            // Occasional missing leading reading
            if f == 0 && rng.gen_bool(0.02) {
                continue;
            }
            let reading: f32 = rng.gen_range(15.0..45.0);
            text.push_str(&format!("{reading:.2}"));
        }
        text.push('\n');
    }
    text
}

fn bench_position_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("position_decode");
    let mut rng = StdRng::seed_from_u64(7);
    let decoder = PositionDecoder::default();

    for num_points in [1_000, 10_000, 100_000] {
        let text = synthetic_points(num_points, &mut rng);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            &text,
            |b, text| {
                b.iter(|| decoder.decode(black_box(text.as_bytes())).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");
    let mut rng = StdRng::seed_from_u64(11);
    let decoder = FrameSeriesDecoder::default();

    for (num_points, frames) in [(1_000, 100), (10_000, 100), (10_000, 500)] {
        let text = synthetic_frames(num_points, frames, &mut rng);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_points}x{frames}")),
            &text,
            |b, text| {
                b.iter(|| decoder.decode(black_box(text.as_bytes()), num_points).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(13);
    let num_points = 10_000;
    let positions = PositionDecoder::default()
        .decode(synthetic_points(num_points, &mut rng).as_bytes())
        .unwrap();
    let dataset = FrameSeriesDecoder::default()
        .decode(synthetic_frames(num_points, 50, &mut rng).as_bytes(), num_points)
        .unwrap();

    c.bench_function("serialize_10000", |b| {
        b.iter(|| serialize(black_box(&positions), black_box(&dataset)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_position_decode,
    bench_frame_decode,
    bench_serialize
);
criterion_main!(benches);
