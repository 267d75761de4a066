use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use mmcq::{Histogram, MaxColors};
use palette::{cast, Srgb};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// Pixel sets of increasing size, clustered around a few base colors like a real photo.
fn pixel_sets() -> Vec<(String, Vec<Srgb<u8>>)> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
    let bases = (0..12).map(|_| rng.gen::<[u8; 3]>()).collect::<Vec<_>>();

    [10_000, 100_000, 1_000_000]
        .into_iter()
        .map(|len| {
            let pixels = (0..len)
                .map(|_| {
                    let base = bases[rng.gen_range(0..bases.len())];
                    cast::from_array(base.map(|c| c.saturating_add(rng.gen_range(0..24))))
                })
                .collect();
            (len.to_string(), pixels)
        })
        .collect()
}

fn bench(
    c: &mut Criterion,
    group: &str,
    sets: &[(String, Vec<Srgb<u8>>)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(MaxColors, &Vec<Srgb<u8>>)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [(16u16, 2), (64, 3), (256, 4)] {
        let k = MaxColors::try_from(k).unwrap();
        group.measurement_time(Duration::from_secs(secs));
        for (name, pixels) in sets {
            group.bench_with_input(BenchmarkId::new(k.to_string(), name), &(k, pixels), &mut f);
        }
    }
}

fn histogram_single(c: &mut Criterion) {
    let sets = pixel_sets();
    let mut group = c.benchmark_group("histogram_single");
    for (name, pixels) in &sets {
        group.bench_with_input(BenchmarkId::from_parameter(name), pixels, |b, pixels| {
            b.iter(|| Histogram::new(pixels))
        });
    }
}

fn histogram_par(c: &mut Criterion) {
    let sets = pixel_sets();
    let mut group = c.benchmark_group("histogram_par");
    for (name, pixels) in &sets {
        group.bench_with_input(BenchmarkId::from_parameter(name), pixels, |b, pixels| {
            b.iter(|| Histogram::new_par(pixels))
        });
    }
}

fn palette_single(c: &mut Criterion) {
    let sets = pixel_sets();
    bench(c, "palette_single", &sets, |b, &(k, pixels)| {
        b.iter(|| mmcq::quantize_srgb(pixels, k).unwrap().palette())
    })
}

fn palette_par(c: &mut Criterion) {
    let sets = pixel_sets();
    bench(c, "palette_par", &sets, |b, &(k, pixels)| {
        b.iter(|| mmcq::quantize_srgb_par(pixels, k).unwrap().palette_par())
    })
}

criterion_group!(benches, histogram_single, histogram_par, palette_single, palette_par);
criterion_main!(benches);
