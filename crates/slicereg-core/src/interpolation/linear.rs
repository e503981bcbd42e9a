//! Linear interpolation implementation.
//!
//! Trilinear interpolation over the eight voxels surrounding each sample.

use burn::tensor::backend::Backend;
use burn::tensor::{Bool, Int, Tensor, TensorData};

use super::trait_::{flat_offset, nearest_on_axis, Interpolator};
use crate::spatial::Point3;

/// Linear Interpolator.
///
/// A sample is inside the volume when its nearest voxel is, matching the
/// support of [`NearestNeighborInterpolator`](super::NearestNeighborInterpolator).
/// Coordinates in the half-voxel rim are clamped to the edge before blending.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Create a new linear interpolator.
    pub fn new() -> Self {
        Self
    }
}

/// Lower corner, upper corner and weight of the upper corner along one axis.
fn axis_support(coord: f64, dim: usize) -> Option<(usize, usize, f64)> {
    nearest_on_axis(coord, dim)?;
    let max = (dim - 1) as f64;
    let c = coord.clamp(0.0, max);
    let lo = c.floor();
    let hi = (lo + 1.0).min(max);
    Some((lo as usize, hi as usize, c - lo))
}

impl<B: Backend> Interpolator<B> for LinearInterpolator {
    fn interpolate(&self, data: &Tensor<B, 3>, indices: &[Point3], default_value: f64) -> Tensor<B, 1> {
        let shape = data.dims();
        let n = indices.len();
        let device = data.device();

        // corner c = (bit2, bit1, bit0) selects hi/lo along (i, j, k)
        let mut offsets: Vec<Vec<i64>> = vec![Vec::with_capacity(n); 8];
        let mut weights: Vec<Vec<f64>> = vec![Vec::with_capacity(n); 8];
        let mut outside = Vec::with_capacity(n);

        for index in indices {
            let support = (
                axis_support(index[0], shape[0]),
                axis_support(index[1], shape[1]),
                axis_support(index[2], shape[2]),
            );
            let (Some(si), Some(sj), Some(sk)) = support else {
                for corner in 0..8 {
                    offsets[corner].push(0);
                    weights[corner].push(0.0);
                }
                outside.push(true);
                continue;
            };

            for corner in 0..8 {
                let pick = |(lo, hi, w): (usize, usize, f64), bit: usize| {
                    if corner & bit != 0 {
                        (hi, w)
                    } else {
                        (lo, 1.0 - w)
                    }
                };
                let (i, wi) = pick(si, 4);
                let (j, wj) = pick(sj, 2);
                let (k, wk) = pick(sk, 1);
                offsets[corner].push(flat_offset([i, j, k], shape));
                weights[corner].push(wi * wj * wk);
            }
            outside.push(false);
        }

        let flat = data.clone().reshape([shape[0] * shape[1] * shape[2]]);
        let mut result = Tensor::<B, 1>::zeros([n], &device);
        for (corner_offsets, corner_weights) in offsets.into_iter().zip(weights) {
            let idx = Tensor::<B, 1, Int>::from_data(TensorData::new(corner_offsets, [n]), &device);
            let w = Tensor::<B, 1>::from_data(TensorData::new(corner_weights, [n]), &device);
            result = result + flat.clone().gather(0, idx) * w;
        }

        let outside = Tensor::<B, 1, Bool>::from_data(TensorData::new(outside, [n]), &device);
        result.mask_fill(outside, default_value)
    }
}
