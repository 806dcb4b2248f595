//! End-to-end scenarios for the vertical profile aggregator.
//!
//! Volumes come from `test-utils` generators, go through footprint masking
//! and aggregation, and are checked against hand-computed values.

use chrono::{TimeZone, Utc};
use profile_processor::{
    AggregatorConfig, FootprintMask, MaskedVolume, ProfileError, ProfileRecord, RadarVolume,
    VerticalProfileAggregator,
};
use storm_common::{BoundingBox, GeoTransform, GridShape, Polygon};
use test_utils::{
    assert_approx_eq, create_convective_cell, create_noisy_volume, create_square_polygon,
    create_uniform_volume, fixtures, RawVolume,
};

fn masked(raw: RawVolume, width: usize, height: usize) -> MaskedVolume {
    let volume = RadarVolume::from_raw(raw, GridShape::new(width, height), fixtures::radar::SENTINEL)
        .expect("valid volume");
    MaskedVolume::unmasked(volume)
}

fn aggregator() -> VerticalProfileAggregator {
    VerticalProfileAggregator::new(AggregatorConfig::default()).expect("default config is valid")
}

// ============================================================================
// Missing data
// ============================================================================

#[test]
fn test_uniform_missing_volume_yields_zeros() {
    let volume = masked(create_uniform_volume(6, 5, &[f32::NAN; 4]), 6, 5);
    let summary = aggregator().aggregate(&volume).unwrap();

    assert!(summary.vil.data.iter().all(|&v| v == 0.0));
    assert!(summary.vii.data.iter().all(|&v| v == 0.0));
    assert!(summary.viwl.data.iter().all(|&v| v == 0.0));
    assert_eq!(summary.max_vil, 0.0);
    assert_eq!(summary.max_vii, 0.0);
    assert_eq!(summary.max_viwl, 0.0);
    assert_eq!(summary.echotop_0, 0.0);
    assert!(summary.cfad.data.iter().all(|&c| c == 0));
}

#[test]
fn test_all_missing_level_next_to_valid_level_contributes_zero() {
    let volume = masked(create_uniform_volume(4, 4, &[f32::NAN, 30.0]), 4, 4);
    let summary = aggregator().aggregate(&volume).unwrap();

    assert!(summary.vil.data.iter().all(|&v| v == 0.0));
    assert!(summary.vii.data.iter().all(|&v| v == 0.0));
    assert!(summary.viwl.data.iter().all(|&v| v == 0.0));
}

#[test]
fn test_missing_level_inside_ice_layers_zeroes_vii() {
    // 10 levels: VII gets layers 7 and 8, both touch the empty level 8
    let mut levels = [30.0f32; 10];
    levels[8] = f32::NAN;
    let volume = masked(create_uniform_volume(3, 3, &levels), 3, 3);
    let summary = aggregator().aggregate(&volume).unwrap();

    let term = 30.0f64.powf(4.0 / 7.0) * 3.44e-6 * 1000.0;
    assert_eq!(summary.max_vii, 0.0);
    assert_approx_eq!(summary.max_vil, 7.0 * term, 1e-12);
    assert_approx_eq!(summary.max_viwl, 6.0 * term, 1e-12);
}

#[test]
fn test_single_level_is_insufficient() {
    let volume = masked(create_uniform_volume(3, 3, &[30.0]), 3, 3);
    let err = aggregator().aggregate(&volume).unwrap_err();
    assert!(matches!(err, ProfileError::InsufficientData { levels: 1 }));
}

// ============================================================================
// Echo tops
// ============================================================================

#[test]
fn test_echo_tops_of_fifteen_level_volume() {
    // Only level 10 reaches 40 dBZ, levels 0..=12 reach 20, all 15 reach 0
    let mut levels = [25.0f32; 15];
    levels[10] = 45.0;
    levels[13] = 5.0;
    levels[14] = 5.0;
    let volume = masked(create_uniform_volume(4, 4, &levels), 4, 4);
    let summary = aggregator().aggregate(&volume).unwrap();

    assert_eq!(summary.echotop_40, 12.0);
    assert_eq!(summary.echotop_20, 14.0);
    assert_eq!(summary.echotop_0, 16.0);
}

#[test]
fn test_echo_top_never_above_highest_crossing() {
    let raw = create_convective_cell(15, 15, 12, 60.0, 9);
    let volume = masked(raw.clone(), 15, 15);
    let summary = aggregator().aggregate(&volume).unwrap();

    let highest = |threshold: f32| {
        (1..raw.len())
            .rev()
            .find(|&l| raw[l].iter().any(|&v| v >= threshold))
            .map_or(0.0, |l| l as f64 + 2.0)
    };
    assert_eq!(summary.echotop_40, highest(40.0));
    assert_eq!(summary.echotop_20, highest(20.0));
    assert_eq!(summary.echotop_0, highest(0.0));
    assert!(summary.echotop_40 <= summary.echotop_20);
    assert!(summary.echotop_20 <= summary.echotop_0);
}

// ============================================================================
// Integrated water
// ============================================================================

#[test]
fn test_two_level_scenario_is_deterministic() {
    let volume = masked(create_uniform_volume(5, 4, &[10.0, 30.0]), 5, 4);
    let summary = aggregator().aggregate(&volume).unwrap();

    let expected = 20.0f64.powf(4.0 / 7.0) * (3.44e-6 * 1000.0);
    assert_eq!(summary.vil.shape(), GridShape::new(5, 4));
    for &v in &summary.vil.data {
        assert_approx_eq!(v, expected, 1e-12);
    }
    assert_approx_eq!(summary.max_vil, expected, 1e-12);
    assert_eq!(summary.max_vii, 0.0);

    let ts = Utc.with_ymd_and_hms(2014, 3, 2, 14, 24, 0).unwrap();
    let record = ProfileRecord::from_summary("cell", ts, &summary, aggregator().config()).unwrap();
    let stored = profile_processor::npy::unpack(&record.vil_kgm2).unwrap();
    let stored_value = (expected * 10_000.0).round() as i16;
    assert!(stored.data.iter().all(|&v| v == stored_value));
}

#[test]
fn test_stored_vil_round_trips_within_tolerance() {
    let volume = masked(create_convective_cell(21, 21, 12, 58.0, 10), 21, 21);
    let summary = aggregator().aggregate(&volume).unwrap();
    let ts = Utc.with_ymd_and_hms(2014, 3, 2, 14, 24, 0).unwrap();
    let record = ProfileRecord::from_summary("cell", ts, &summary, aggregator().config()).unwrap();

    for (decoded, original) in [
        (record.vil(10_000.0).unwrap(), &summary.vil),
        (record.vii(10_000.0).unwrap(), &summary.vii),
        (record.viwl(10_000.0).unwrap(), &summary.viwl),
    ] {
        assert_eq!(decoded.shape(), original.shape());
        for (d, o) in decoded.data.iter().zip(&original.data) {
            assert!((d - o).abs() <= 0.5e-4 + 1e-12, "{} vs {}", d, o);
        }
    }
}

// ============================================================================
// CFAD
// ============================================================================

#[test]
fn test_cfad_rows_sum_to_valid_pixels() {
    let volume = masked(create_noisy_volume(16, 12, 6, 3), 16, 12);
    let summary = aggregator().aggregate(&volume).unwrap();

    let cropped = volume.clone().crop_to_reference(1).unwrap();
    for level in 0..cropped.level_count() {
        let total: u32 = summary.cfad.row(level).iter().sum();
        assert_eq!(total as usize, cropped.valid_count(level), "level {}", level);
    }
}

// ============================================================================
// Purity
// ============================================================================

#[test]
fn test_aggregate_is_idempotent() {
    let volume = masked(create_noisy_volume(10, 10, 8, 11), 10, 10);
    let aggregator = aggregator();
    let first = aggregator.aggregate(&volume).unwrap();
    let second = aggregator.aggregate(&volume).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Footprints
// ============================================================================

#[test]
fn test_geo_footprint_restricts_columns() {
    let (w, h) = (fixtures::radar::SMALL_WIDTH, fixtures::radar::SMALL_HEIGHT);
    let (min_x, min_y, max_x, max_y) = fixtures::radar::MANAUS_EXTENT;
    let transform = GeoTransform::from_extent(&BoundingBox::new(min_x, min_y, max_x, max_y), w, h)
        .unwrap();
    let polygon = Polygon::try_from(create_square_polygon(-60.5, -3.5, 0.5)).unwrap();

    let shape = GridShape::new(w, h);
    let mask = FootprintMask::from_geo_polygon(shape, &polygon, &transform).unwrap();
    assert_eq!(mask.count(), 81);

    let volume = RadarVolume::from_raw(
        create_uniform_volume(w, h, &[20.0, 40.0, 30.0]),
        shape,
        fixtures::radar::SENTINEL,
    )
    .unwrap();
    let config = AggregatorConfig {
        crop_reference_level: None,
        ..Default::default()
    };
    let summary = VerticalProfileAggregator::new(config)
        .unwrap()
        .aggregate(&MaskedVolume::new(volume, mask.clone()).unwrap())
        .unwrap();

    let nonzero = summary.vil.data.iter().filter(|&&v| v > 0.0).count();
    assert_eq!(nonzero, 81);
    assert!(mask.contains_index(shape.flat_index(36, 28)));
    assert!(summary.vil.data[shape.flat_index(36, 28)] > 0.0);
    assert_eq!(summary.vil.data[0], 0.0);

    // Cropping to the footprint trims the grid to its 9 x 9 bounding box
    let summary = aggregator()
        .aggregate(&MaskedVolume::new(
            RadarVolume::from_raw(
                create_uniform_volume(w, h, &[20.0, 40.0, 30.0]),
                shape,
                fixtures::radar::SENTINEL,
            )
            .unwrap(),
            mask,
        )
        .unwrap())
        .unwrap();
    assert_eq!(summary.vil.shape(), GridShape::new(9, 9));
    assert_eq!(summary.cfad.row(1).iter().sum::<u32>(), 81);
}
