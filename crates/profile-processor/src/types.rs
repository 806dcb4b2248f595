//! Core grid container.

use serde::{Deserialize, Serialize};
use storm_common::GridShape;

use crate::error::{ProfileError, Result};

/// A 2-D grid of values stored in row-major order (row 0 first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    /// The grid values, `height * width` of them.
    pub data: Vec<T>,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl<T: Copy> Grid<T> {
    /// Wrap row-major data, checking its length against the shape.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(ProfileError::shape_mismatch(
                "grid data",
                format!("{} values", width * height),
                format!("{} values", data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Grid of `shape` with every cell set to `value`.
    pub fn filled(shape: GridShape, value: T) -> Self {
        Self {
            data: vec![value; shape.len()],
            width: shape.width,
            height: shape.height,
        }
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ProfileError::shape_mismatch(
                    format!("row {}", i),
                    width,
                    row.len(),
                ));
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn shape(&self) -> GridShape {
        GridShape::new(self.width, self.height)
    }

    /// Get the value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    /// Apply `f` to every cell.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: Fn(T) -> U,
    {
        Grid {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Keep only the listed rows and columns (both ascending).
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Grid<T> {
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for &r in rows {
            let row = self.row(r);
            data.extend(cols.iter().map(|&c| row[c]));
        }
        Grid {
            data,
            width: cols.len(),
            height: rows.len(),
        }
    }
}

impl Grid<f64> {
    /// Largest value in the grid, ignoring NaN. Zero for an empty or all-NaN grid.
    pub fn max_value(&self) -> f64 {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(Grid::new(vec![1.0f32; 6], 3, 2).is_ok());
        assert!(matches!(
            Grid::new(vec![1.0f32; 5], 3, 2),
            Err(ProfileError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_rows_and_get() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.get(1, 0), Some(4));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.row(0), &[1, 2, 3]);
    }

    #[test]
    fn test_from_rows_ragged() {
        assert!(Grid::from_rows(vec![vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn test_select_non_contiguous() {
        let grid = Grid::from_rows(vec![
            vec![1, 2, 3],
            vec![4, 5, 6],
            vec![7, 8, 9],
        ])
        .unwrap();
        let sub = grid.select(&[0, 2], &[0, 2]);
        assert_eq!(sub.data, vec![1, 3, 7, 9]);
        assert_eq!(sub.shape(), GridShape::new(2, 2));
    }

    #[test]
    fn test_max_value() {
        let grid = Grid::new(vec![1.0, f64::NAN, 3.5, -2.0], 2, 2).unwrap();
        assert_eq!(grid.max_value(), 3.5);
        let empty: Grid<f64> = Grid::new(vec![], 0, 0).unwrap();
        assert_eq!(empty.max_value(), 0.0);
    }
}
