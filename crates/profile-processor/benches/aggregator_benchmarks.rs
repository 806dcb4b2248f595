//! Benchmarks for the profile-processor crate.
//!
//! Run with: cargo bench --package profile-processor
//! Or: cargo bench --package profile-processor --bench aggregator_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use profile_processor::{
    compute_cfad, compute_echo_tops, compute_integrated, npy, AggregatorConfig, CfadBins,
    FootprintMask, MaskedVolume, OverflowPolicy, RadarVolume, ScaledGrid,
    VerticalProfileAggregator,
};
use storm_common::{GridShape, Polygon};
use test_utils::{create_convective_cell, fixtures};

fn cell_volume(size: usize) -> MaskedVolume {
    let raw = create_convective_cell(size, size, fixtures::radar::CAPPI_LEVELS, 60.0, 11);
    let volume = RadarVolume::from_raw(raw, GridShape::new(size, size), fixtures::radar::SENTINEL)
        .expect("valid volume");
    MaskedVolume::unmasked(volume)
}

// =============================================================================
// AGGREGATION BENCHMARKS
// =============================================================================

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let aggregator =
        VerticalProfileAggregator::new(AggregatorConfig::default()).expect("valid config");

    for size in [16usize, 64, 128] {
        let volume = cell_volume(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &volume, |b, volume| {
            b.iter(|| aggregator.aggregate(black_box(volume)))
        });
    }

    group.finish();
}

fn bench_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("components");
    let config = AggregatorConfig::default();
    let bins = CfadBins::from_config(&config);
    let volume = cell_volume(64);

    group.bench_function("cfad_64", |b| {
        b.iter(|| compute_cfad(black_box(&volume), &bins))
    });
    group.bench_function("integrated_64", |b| {
        b.iter(|| compute_integrated(black_box(&volume), &config))
    });
    group.bench_function("echo_tops_64", |b| {
        b.iter(|| compute_echo_tops(black_box(&volume), &config))
    });
    group.bench_function("crop_64", |b| {
        b.iter(|| black_box(volume.clone()).crop_to_reference(1))
    });

    group.finish();
}

// =============================================================================
// FOOTPRINT BENCHMARKS
// =============================================================================

fn bench_footprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("footprint");
    let shape = GridShape::new(fixtures::radar::CAPPI_WIDTH, fixtures::radar::CAPPI_HEIGHT);
    let polygon = Polygon::new(vec![
        (200.0, 180.0),
        (260.0, 210.0),
        (290.0, 300.0),
        (230.0, 320.0),
        (190.0, 260.0),
    ])
    .expect("valid polygon");

    group.bench_function("rasterize_pentagon_500", |b| {
        b.iter(|| FootprintMask::from_grid_polygon(shape, black_box(&polygon)))
    });

    group.finish();
}

// =============================================================================
// STORAGE BENCHMARKS
// =============================================================================

fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing");
    let aggregator =
        VerticalProfileAggregator::new(AggregatorConfig::default()).expect("valid config");
    let summary = aggregator.aggregate(&cell_volume(128)).expect("aggregates");

    group.bench_function("encode_vil_128", |b| {
        b.iter(|| ScaledGrid::encode(black_box(&summary.vil), 10_000.0, OverflowPolicy::Saturate))
    });

    let scaled = ScaledGrid::encode(&summary.vil, 10_000.0, OverflowPolicy::Saturate)
        .expect("encodes");
    group.bench_function("npy_pack_128", |b| {
        b.iter(|| npy::pack(black_box(&scaled.values)))
    });

    let packed = scaled.to_packed();
    group.bench_function("npy_unpack_128", |b| {
        b.iter(|| npy::unpack(black_box(&packed)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_aggregate,
    bench_components,
    bench_footprint,
    bench_packing,
);
criterion_main!(benches);
