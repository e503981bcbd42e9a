//! Nearest neighbor interpolation implementation.

use burn::tensor::backend::Backend;
use burn::tensor::{Bool, Int, Tensor, TensorData};

use super::trait_::{flat_offset, nearest_on_axis, Interpolator};
use crate::spatial::Point3;

/// Nearest Neighbor Interpolator.
///
/// Rounds each continuous index to the nearest voxel. Samples whose nearest
/// voxel lies outside the volume receive the default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborInterpolator;

impl NearestNeighborInterpolator {
    /// Create a new nearest neighbor interpolator.
    pub fn new() -> Self {
        Self
    }

    /// Nearest voxel for a continuous index, if it lies inside `shape`.
    pub fn nearest_voxel(index: &Point3, shape: [usize; 3]) -> Option<[usize; 3]> {
        Some([
            nearest_on_axis(index[0], shape[0])?,
            nearest_on_axis(index[1], shape[1])?,
            nearest_on_axis(index[2], shape[2])?,
        ])
    }
}

impl<B: Backend> Interpolator<B> for NearestNeighborInterpolator {
    fn interpolate(&self, data: &Tensor<B, 3>, indices: &[Point3], default_value: f64) -> Tensor<B, 1> {
        let shape = data.dims();
        let n = indices.len();
        let device = data.device();

        let mut offsets = Vec::with_capacity(n);
        let mut outside = Vec::with_capacity(n);
        for index in indices {
            match Self::nearest_voxel(index, shape) {
                Some(voxel) => {
                    offsets.push(flat_offset(voxel, shape));
                    outside.push(false);
                }
                None => {
                    // gathered, then overwritten by the mask
                    offsets.push(0);
                    outside.push(true);
                }
            }
        }

        let offsets = Tensor::<B, 1, Int>::from_data(TensorData::new(offsets, [n]), &device);
        let outside = Tensor::<B, 1, Bool>::from_data(TensorData::new(outside, [n]), &device);

        let flat = data.clone().reshape([shape[0] * shape[1] * shape[2]]);
        flat.gather(0, offsets).mask_fill(outside, default_value)
    }
}
