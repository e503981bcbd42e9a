//! Point type for representing spatial coordinates.
//!
//! Points are used both for physical positions (µm, shared CCF space) and for
//! continuous voxel indices before rounding.

use nalgebra::Point as NaPoint;
use serde::{Deserialize, Serialize};

/// A point in D-dimensional space, backed by `nalgebra::Point<f64, D>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a new point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// Create a point at the origin (all coordinates zero).
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Create a point from integer indices.
    pub fn from_index(index: [usize; D]) -> Self {
        Self::new(index.map(|i| i as f64))
    }

    /// Copy the coordinates out as an array.
    pub fn to_array(&self) -> [f64; D] {
        let mut coords = [0.0; D];
        for (i, c) in coords.iter_mut().enumerate() {
            *c = self.0.coords[i];
        }
        coords
    }

    /// Scale every coordinate by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self(NaPoint::from(self.0.coords * factor))
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.0.coords.iter().all(|c| c.is_finite())
    }
}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> From<[f64; D]> for Point<D> {
    fn from(coords: [f64; D]) -> Self {
        Self::new(coords)
    }
}
