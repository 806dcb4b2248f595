//! Storage codecs for profile grids.
//!
//! Two layers:
//!
//! - [`ScaledGrid`] narrows a physical `f64` grid to `i16` after multiplying
//!   by a storage scale (10^4 for VIL/VII/VIWL). Readers must divide by the
//!   same scale; [`ScaledGrid::decode`] does exactly that.
//! - [`npy`] serializes an `i16` grid to the NumPy `.npy` byte layout, the
//!   format the tracking database stores in its array columns.

use bytes::Bytes;

use crate::config::OverflowPolicy;
use crate::error::{ProfileError, Result};
use crate::types::Grid;

/// A grid stored as scaled 16-bit integers.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledGrid {
    /// Stored integers, `round(value * scale)`.
    pub values: Grid<i16>,
    /// Multiplier used on encode.
    pub scale: f64,
    /// Cells clamped to the i16 range during encode.
    pub saturated: usize,
}

impl ScaledGrid {
    /// Scale, round to nearest and narrow to i16.
    ///
    /// NaN encodes as 0. Values that do not fit in i16 are rejected or
    /// clamped according to `policy`; they are never wrapped.
    pub fn encode(grid: &Grid<f64>, scale: f64, policy: OverflowPolicy) -> Result<Self> {
        let mut saturated = 0;
        let mut data = Vec::with_capacity(grid.data.len());

        for (index, &value) in grid.data.iter().enumerate() {
            if value.is_nan() {
                data.push(0);
                continue;
            }
            let scaled = (value * scale).round();
            if scaled > i16::MAX as f64 || scaled < i16::MIN as f64 {
                match policy {
                    OverflowPolicy::Reject => {
                        return Err(ProfileError::ScaledOverflow { index, value });
                    }
                    OverflowPolicy::Saturate => {
                        saturated += 1;
                        data.push(if scaled > 0.0 { i16::MAX } else { i16::MIN });
                    }
                }
            } else {
                data.push(scaled as i16);
            }
        }

        Ok(Self {
            values: Grid {
                data,
                width: grid.width,
                height: grid.height,
            },
            scale,
            saturated,
        })
    }

    /// Recover physical values by dividing by the storage scale.
    pub fn decode(&self) -> Grid<f64> {
        let scale = self.scale;
        self.values.map(|v| v as f64 / scale)
    }

    /// Serialize the stored integers as a packed array.
    pub fn to_packed(&self) -> Bytes {
        npy::pack(&self.values)
    }

    /// Read a packed array written with `scale`.
    pub fn from_packed(bytes: &[u8], scale: f64) -> Result<Self> {
        Ok(Self {
            values: npy::unpack(bytes)?,
            scale,
            saturated: 0,
        })
    }
}

/// Narrow CFAD counts to i16 with the same overflow rules.
pub fn encode_counts(counts: &Grid<u32>, policy: OverflowPolicy) -> Result<ScaledGrid> {
    ScaledGrid::encode(&counts.map(|c| c as f64), 1.0, policy)
}

/// Minimal NumPy `.npy` codec for 2-D little-endian `i16` arrays.
pub mod npy {
    use bytes::{Buf, BufMut, Bytes, BytesMut};

    use crate::error::{ProfileError, Result};
    use crate::types::Grid;

    /// File magic.
    pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

    /// Header (magic + version + length + dict) is padded to this alignment.
    pub const HEADER_ALIGN: usize = 64;

    const DESCR: &str = "<i2";

    /// Encode a grid as NPY version 1.0, C order.
    pub fn pack(grid: &Grid<i16>) -> Bytes {
        let dict = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': ({}, {}), }}",
            DESCR, grid.height, grid.width
        );
        // magic(6) + version(2) + header_len(2) + dict + padding + '\n'
        let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
        let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
        let header_len = dict.len() + padding + 1;

        let mut buf = BytesMut::with_capacity(10 + header_len + grid.data.len() * 2);
        buf.put_slice(MAGIC);
        buf.put_u8(1);
        buf.put_u8(0);
        buf.put_u16_le(header_len as u16);
        buf.put_slice(dict.as_bytes());
        buf.put_bytes(b' ', padding);
        buf.put_u8(b'\n');
        for &v in &grid.data {
            buf.put_i16_le(v);
        }
        buf.freeze()
    }

    /// Decode an NPY (version 1.x or 2.x) 2-D `<i2` array.
    pub fn unpack(bytes: &[u8]) -> Result<Grid<i16>> {
        let mut buf = bytes;
        if buf.remaining() < 10 || &buf[..6] != MAGIC {
            return Err(ProfileError::invalid_packed("missing NPY magic"));
        }
        buf.advance(6);
        let major = buf.get_u8();
        let _minor = buf.get_u8();

        let header_len = match major {
            1 => buf.get_u16_le() as usize,
            2 | 3 => {
                if buf.remaining() < 4 {
                    return Err(ProfileError::invalid_packed("truncated header length"));
                }
                buf.get_u32_le() as usize
            }
            v => {
                return Err(ProfileError::invalid_packed(format!(
                    "unsupported NPY version {}",
                    v
                )))
            }
        };
        if buf.remaining() < header_len {
            return Err(ProfileError::invalid_packed("truncated header"));
        }
        let header = std::str::from_utf8(&buf[..header_len])
            .map_err(|_| ProfileError::invalid_packed("header is not UTF-8"))?;
        buf.advance(header_len);

        let descr = header_field(header, "descr")
            .ok_or_else(|| ProfileError::invalid_packed("header has no descr"))?;
        if descr.trim_matches(|c| c == '\'' || c == '"') != DESCR {
            return Err(ProfileError::invalid_packed(format!(
                "unsupported dtype {}",
                descr
            )));
        }
        if header_field(header, "fortran_order") != Some("False") {
            return Err(ProfileError::invalid_packed("Fortran order is not supported"));
        }
        let (height, width) = parse_shape(header)?;

        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(2))
            .ok_or_else(|| ProfileError::invalid_packed("shape too large"))?;
        if buf.remaining() < expected {
            return Err(ProfileError::invalid_packed(format!(
                "expected {} data bytes, found {}",
                expected,
                buf.remaining()
            )));
        }
        let data = (0..height * width).map(|_| buf.get_i16_le()).collect();
        Ok(Grid {
            data,
            width,
            height,
        })
    }

    /// Raw text of a scalar field in the header dict (up to the next comma).
    fn header_field<'a>(header: &'a str, key: &str) -> Option<&'a str> {
        let start = header.find(&format!("'{}':", key))? + key.len() + 3;
        let rest = header[start..].trim_start();
        let end = rest.find([',', '}']).unwrap_or(rest.len());
        Some(rest[..end].trim())
    }

    fn parse_shape(header: &str) -> Result<(usize, usize)> {
        let start = header
            .find("'shape':")
            .ok_or_else(|| ProfileError::invalid_packed("header has no shape"))?;
        let rest = &header[start..];
        let open = rest
            .find('(')
            .ok_or_else(|| ProfileError::invalid_packed("malformed shape"))?;
        let close = rest
            .find(')')
            .ok_or_else(|| ProfileError::invalid_packed("malformed shape"))?;
        let dims = rest[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| ProfileError::invalid_packed(format!("bad dimension {}", s)))
            })
            .collect::<Result<Vec<_>>>()?;

        match dims.as_slice() {
            [h, w] => Ok((*h, *w)),
            _ => Err(ProfileError::invalid_packed(format!(
                "expected a 2-D array, got {} dimensions",
                dims.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rounds_and_decodes() {
        let grid = Grid::new(vec![0.01903, 1.23456, 0.0, -0.00004], 2, 2).unwrap();
        let scaled = ScaledGrid::encode(&grid, 10_000.0, OverflowPolicy::Reject).unwrap();
        assert_eq!(scaled.values.data, vec![190, 12346, 0, 0]);

        let decoded = scaled.decode();
        for (a, b) in grid.data.iter().zip(&decoded.data) {
            assert!((a - b).abs() <= 0.5e-4 + 1e-12);
        }
    }

    #[test]
    fn test_overflow_is_rejected() {
        let grid = Grid::new(vec![1.0, 3.5], 2, 1).unwrap();
        let err = ScaledGrid::encode(&grid, 10_000.0, OverflowPolicy::Reject).unwrap_err();
        assert!(matches!(err, ProfileError::ScaledOverflow { index: 1, .. }));
    }

    #[test]
    fn test_overflow_saturates_without_wrapping() {
        let grid = Grid::new(vec![3.5, -4.0, 1.0], 3, 1).unwrap();
        let scaled = ScaledGrid::encode(&grid, 10_000.0, OverflowPolicy::Saturate).unwrap();
        assert_eq!(scaled.values.data, vec![i16::MAX, i16::MIN, 10_000]);
        assert_eq!(scaled.saturated, 2);
    }

    #[test]
    fn test_nan_encodes_as_zero() {
        let grid = Grid::new(vec![f64::NAN], 1, 1).unwrap();
        let scaled = ScaledGrid::encode(&grid, 10_000.0, OverflowPolicy::Reject).unwrap();
        assert_eq!(scaled.values.data, vec![0]);
    }

    #[test]
    fn test_npy_layout() {
        let grid = Grid::new(vec![1i16, -2, 300, 4, 5, 6], 3, 2).unwrap();
        let bytes = npy::pack(&grid);

        assert_eq!(&bytes[..6], npy::MAGIC);
        assert_eq!(bytes[6], 1);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % npy::HEADER_ALIGN, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');

        let header = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(header.contains("'descr': '<i2'"));
        assert!(header.contains("'shape': (2, 3)"));
        assert_eq!(bytes.len(), 10 + header_len + 12);
        assert_eq!(&bytes[10 + header_len..10 + header_len + 2], &[1, 0]);
    }

    #[test]
    fn test_npy_unpack_matches_pack() {
        let grid = Grid::new(vec![7i16, i16::MIN, i16::MAX, 0], 2, 2).unwrap();
        let unpacked = npy::unpack(&npy::pack(&grid)).unwrap();
        assert_eq!(unpacked, grid);
    }

    #[test]
    fn test_npy_rejects_bad_input() {
        assert!(npy::unpack(b"not an npy").is_err());

        let grid = Grid::new(vec![1i16, 2, 3, 4], 2, 2).unwrap();
        let bytes = npy::pack(&grid);
        assert!(npy::unpack(&bytes[..bytes.len() - 1]).is_err());

        let text = String::from_utf8_lossy(&bytes).replace("<i2", "<f4");
        assert!(npy::unpack(text.as_bytes()).is_err());
    }

    #[test]
    fn test_npy_rejects_oversized_shape() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(npy::MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        let dict = "{'descr': '<i2', 'fortran_order': False, 'shape': (9223372036854775807, 4), }\n";
        bytes.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.extend_from_slice(&[0; 16]);
        match npy::unpack(&bytes) {
            Err(ProfileError::InvalidPackedArray(msg)) => assert_eq!(msg, "shape too large"),
            other => panic!("expected InvalidPackedArray, got {:?}", other),
        }
    }

    #[test]
    fn test_npy_rejects_three_dimensions() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(npy::MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        let dict = "{'descr': '<i2', 'fortran_order': False, 'shape': (1, 1, 1), }\n";
        bytes.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            npy::unpack(&bytes),
            Err(ProfileError::InvalidPackedArray(_))
        ));
    }

    #[test]
    fn test_encode_counts() {
        let counts = Grid::new(vec![0u32, 12, 40_000], 3, 1).unwrap();
        let packed = encode_counts(&counts, OverflowPolicy::Saturate).unwrap();
        assert_eq!(packed.values.data, vec![0, 12, i16::MAX]);
        assert_eq!(packed.saturated, 1);
    }
}
