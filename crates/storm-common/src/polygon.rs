//! Simple polygons for storm-cell outlines.

use crate::{BoundingBox, GeoError, GeoResult};
use serde::{Deserialize, Serialize};

/// A closed polygon given by its outer ring.
///
/// The ring may or may not repeat the first vertex at the end; both forms
/// describe the same polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    /// Build a polygon from `(x, y)` vertices.
    pub fn new(vertices: Vec<(f64, f64)>) -> GeoResult<Self> {
        if let Some(i) = vertices
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(GeoError::NonFiniteVertex(i));
        }

        let mut vertices = vertices;
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(GeoError::DegeneratePolygon(vertices.len()));
        }

        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Bounding box of the vertices.
    pub fn bbox(&self) -> BoundingBox {
        // new() guarantees at least three vertices
        BoundingBox::enclosing(self.vertices.iter().copied())
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Apply `f` to every vertex.
    pub fn map<F>(&self, f: F) -> GeoResult<Self>
    where
        F: Fn(f64, f64) -> (f64, f64),
    {
        Self::new(self.vertices.iter().map(|&(x, y)| f(x, y)).collect())
    }

    /// Even-odd point-in-polygon test.
    ///
    /// Points exactly on an edge may land on either side; see [`Self::covers`].
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];
            if (yi > y) != (yj > y) {
                let x_cross = xi + (y - yi) * (xj - xi) / (yj - yi);
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// True when the point lies on one of the polygon edges (within `eps`).
    pub fn on_boundary(&self, x: f64, y: f64, eps: f64) -> bool {
        let n = self.vertices.len();
        (0..n).any(|i| {
            let (ax, ay) = self.vertices[i];
            let (bx, by) = self.vertices[(i + 1) % n];
            let cross = (bx - ax) * (y - ay) - (by - ay) * (x - ax);
            let len = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
            if len == 0.0 {
                return (x - ax).abs() <= eps && (y - ay).abs() <= eps;
            }
            if cross.abs() / len > eps {
                return false;
            }
            let dot = (x - ax) * (bx - ax) + (y - ay) * (by - ay);
            dot >= -eps && dot <= len * len + eps
        })
    }

    /// Inside or on the boundary.
    pub fn covers(&self, x: f64, y: f64) -> bool {
        self.contains(x, y) || self.on_boundary(x, y, 1e-9)
    }
}

impl TryFrom<Vec<[f64; 2]>> for Polygon {
    type Error = GeoError;

    fn try_from(ring: Vec<[f64; 2]>) -> GeoResult<Self> {
        Self::new(ring.into_iter().map(|[x, y]| (x, y)).collect())
    }
}

impl From<Polygon> for Vec<[f64; 2]> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices.into_iter().map(|(x, y)| [x, y]).collect()
    }
}
