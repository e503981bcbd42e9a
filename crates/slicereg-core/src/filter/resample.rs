//! Resample filter.
//!
//! Produces a 2D image by inverse mapping: every output pixel `(row, col)` is
//! treated as the voxel `(0, row, col)` of a one-plane output volume, mapped
//! through an affine transform into the input's continuous index space, and
//! sampled there with an interpolator.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::interpolation::Interpolator;
use crate::spatial::{AffineMatrix, Point3};

/// Resample filter.
///
/// The transform maps output pixel indices to input voxel indices.
///
/// # Type Parameters
/// * `I` - The interpolator type
#[derive(Debug, Clone)]
pub struct ResampleImageFilter<I> {
    size: [usize; 2],
    transform: AffineMatrix,
    interpolator: I,
    default_pixel_value: f64,
}

impl<I> ResampleImageFilter<I> {
    /// Create a new resample filter.
    ///
    /// # Arguments
    /// * `size` - Output image size `[rows, cols]`
    /// * `transform` - Transform from output pixel index to input voxel index
    /// * `interpolator` - Interpolator for input sampling
    pub fn new(size: [usize; 2], transform: AffineMatrix, interpolator: I) -> Self {
        Self {
            size,
            transform,
            interpolator,
            default_pixel_value: 0.0,
        }
    }

    /// Set default pixel value for outside the field of view.
    pub fn with_default_pixel_value(mut self, value: f64) -> Self {
        self.default_pixel_value = value;
        self
    }

    /// Continuous input indices for every output pixel, row-major.
    pub fn source_indices(&self) -> Vec<Point3> {
        let [rows, cols] = self.size;
        let mut indices = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let pixel = Point3::from_index([0, row, col]);
                indices.push(self.transform.transform_point(&pixel));
            }
        }
        indices
    }

    /// Apply filter to an input volume.
    pub fn apply<B: Backend>(&self, input: &Tensor<B, 3>) -> Tensor<B, 2>
    where
        I: Interpolator<B>,
    {
        let indices = self.source_indices();
        let [rows, cols] = self.size;
        self.interpolator
            .interpolate(input, &indices, self.default_pixel_value)
            .reshape([rows, cols])
    }
}
