//! Interpolator trait for sampling values at continuous coordinates.
//!
//! This module defines the core Interpolator trait that all interpolation methods must implement.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::spatial::Point3;

/// Interpolator trait for sampling values at continuous voxel indices.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Interpolator<B: Backend> {
    /// Sample a volume at continuous indices.
    ///
    /// # Arguments
    /// * `data` - The source volume `[D0, D1, D2]`
    /// * `indices` - Continuous `(i, j, k)` indices, one per output sample
    /// * `default_value` - Value for samples that fall outside the volume
    ///
    /// # Returns
    /// Tensor of sampled values `[indices.len()]`
    fn interpolate(&self, data: &Tensor<B, 3>, indices: &[Point3], default_value: f64) -> Tensor<B, 1>;
}

/// Index of the voxel nearest to `coord` along an axis of extent `dim`.
///
/// Rounds half away from zero; `None` if the nearest voxel is outside `[0, dim)`.
pub(crate) fn nearest_on_axis(coord: f64, dim: usize) -> Option<usize> {
    let rounded = coord.round();
    if rounded.is_finite() && rounded >= 0.0 && rounded < dim as f64 {
        Some(rounded as usize)
    } else {
        None
    }
}

/// Row-major flat offset of a voxel in a volume of shape `[d0, d1, d2]`.
pub(crate) fn flat_offset(index: [usize; 3], shape: [usize; 3]) -> i64 {
    ((index[0] * shape[1] + index[1]) * shape[2] + index[2]) as i64
}
