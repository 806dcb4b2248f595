//! Test data generators for creating synthetic radar volumes.
//!
//! Volumes are returned as plain `Vec<Vec<f32>>` (one row-major level per
//! entry, bottom level first) so this crate does not depend on the crates
//! it is used to test.

/// A raw reflectivity volume: `levels[level][row * width + col]` in dBZ.
pub type RawVolume = Vec<Vec<f32>>;

/// Creates a volume where every pixel of level `i` equals `levels_dbz[i]`.
///
/// # Example
///
/// ```
/// use test_utils::create_uniform_volume;
///
/// let volume = create_uniform_volume(4, 3, &[10.0, 30.0]);
/// assert_eq!(volume.len(), 2);
/// assert_eq!(volume[1].len(), 12);
/// assert_eq!(volume[1][0], 30.0);
/// ```
pub fn create_uniform_volume(width: usize, height: usize, levels_dbz: &[f32]) -> RawVolume {
    levels_dbz
        .iter()
        .map(|&dbz| vec![dbz; width * height])
        .collect()
}

/// Creates a single convective cell centred in the grid.
///
/// Reflectivity peaks at `peak_dbz` in the centre of level 0, drops by
/// 40 dBZ towards the cell edge and by 4 dBZ per level. Pixels outside the
/// circular cell and levels above `top_level` are NaN.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `levels` - Number of vertical levels
/// * `peak_dbz` - Reflectivity at the core of the lowest level
/// * `top_level` - Highest level with echo
pub fn create_convective_cell(
    width: usize,
    height: usize,
    levels: usize,
    peak_dbz: f32,
    top_level: usize,
) -> RawVolume {
    let center_x = (width as f32 - 1.0) / 2.0;
    let center_y = (height as f32 - 1.0) / 2.0;
    let radius = (width.min(height) as f32 / 2.0).max(1.0);

    (0..levels)
        .map(|level| {
            let mut data = Vec::with_capacity(width * height);
            for row in 0..height {
                for col in 0..width {
                    let dx = col as f32 - center_x;
                    let dy = row as f32 - center_y;
                    let d = (dx * dx + dy * dy).sqrt() / radius;
                    if level > top_level || d > 1.0 {
                        data.push(f32::NAN);
                    } else {
                        data.push(peak_dbz - 40.0 * d - 4.0 * level as f32);
                    }
                }
            }
            data
        })
        .collect()
}

/// Creates a deterministic pseudo-random volume in `[-20, 65)` dBZ.
///
/// Roughly a quarter of the pixels are NaN.
pub fn create_noisy_volume(width: usize, height: usize, levels: usize, seed: u32) -> RawVolume {
    (0..levels)
        .map(|level| {
            let mut data = Vec::with_capacity(width * height);
            for row in 0..height {
                for col in 0..width {
                    let hash = simple_hash(col as u32, row as u32, seed.wrapping_add(level as u32));
                    if hash % 4 == 0 {
                        data.push(f32::NAN);
                    } else {
                        data.push((hash % 8500) as f32 / 100.0 - 20.0);
                    }
                }
            }
            data
        })
        .collect()
}

/// Serializes a volume as raw little-endian f32, level by level.
///
/// NaN pixels are written as `sentinel`, matching how the CAPPI product
/// stores missing data.
pub fn create_raw_volume_bytes(volume: &RawVolume, sentinel: f32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(volume.iter().map(|l| l.len() * 4).sum());
    for level in volume {
        for &value in level {
            let value = if value.is_nan() { sentinel } else { value };
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    bytes
}

/// Creates an axis-aligned square ring `[[x, y], ...]` with lower-left
/// corner `(min_x, min_y)`.
pub fn create_square_polygon(min_x: f64, min_y: f64, size: f64) -> Vec<[f64; 2]> {
    vec![
        [min_x, min_y],
        [min_x + size, min_y],
        [min_x + size, min_y + size],
        [min_x, min_y + size],
    ]
}

/// Creates `count` deterministic lightning strokes scattered within
/// `spread` degrees of `center`.
pub fn create_strike_cluster(center: (f64, f64), count: usize, spread: f64, seed: u32) -> Vec<(f64, f64)> {
    (0..count)
        .map(|i| {
            let hx = simple_hash(i as u32, 0, seed);
            let hy = simple_hash(i as u32, 1, seed);
            let fx = (hx % 10_000) as f64 / 10_000.0 * 2.0 - 1.0;
            let fy = (hy % 10_000) as f64 / 10_000.0 * 2.0 - 1.0;
            (center.0 + fx * spread, center.1 + fy * spread)
        })
        .collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
