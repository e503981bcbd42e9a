//! Dense 3D sample volumes.
//!
//! A [`Volume`] backs both the atlas reference/annotation volumes `(D0, D1, D2)`
//! and section image channels `(C, H, W)`. It wraps a burn tensor and exposes
//! no mutable access; every "update" builds a new volume.

use burn::tensor::backend::Backend;
use burn::tensor::{Element, ElementConversion, Tensor, TensorData};

use crate::error::{CoreError, Result};

/// Immutable 3D array of samples stored as a float tensor.
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) holding the samples
#[derive(Debug, Clone)]
pub struct Volume<B: Backend> {
    data: Tensor<B, 3>,
}

impl<B: Backend> Volume<B> {
    /// Wrap an existing tensor.
    ///
    /// Fails with [`CoreError::EmptyVolume`] if any extent is zero.
    pub fn from_tensor(data: Tensor<B, 3>) -> Result<Self> {
        let shape = data.dims();
        check_extents(shape)?;
        Ok(Self { data })
    }

    /// Build a volume from a row-major buffer of samples.
    ///
    /// Integer samples are converted to the backend float type.
    ///
    /// # Arguments
    /// * `values` - Samples in row-major (C) order
    /// * `shape` - The volume shape `[D0, D1, D2]`
    /// * `device` - Device to create the tensor on
    pub fn from_vec<E: Element>(values: Vec<E>, shape: [usize; 3], device: &B::Device) -> Result<Self> {
        check_extents(shape)?;
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(CoreError::shape_mismatch(&[expected], &[values.len()]));
        }
        let data = Tensor::<B, 3>::from_data(TensorData::new(values, shape), device);
        Ok(Self { data })
    }

    /// A volume filled with zeros.
    pub fn zeros(shape: [usize; 3], device: &B::Device) -> Result<Self> {
        check_extents(shape)?;
        Ok(Self {
            data: Tensor::zeros(shape, device),
        })
    }

    /// Get the sample tensor.
    pub fn data(&self) -> &Tensor<B, 3> {
        &self.data
    }

    /// Get the volume shape.
    pub fn shape(&self) -> [usize; 3] {
        self.data.dims()
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Always false; empty volumes are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Device holding the samples.
    pub fn device(&self) -> B::Device {
        self.data.device()
    }

    /// Extract the 2D plane at `index` along `axis`.
    ///
    /// Axis 0 yields `(D1, D2)`, axis 1 yields `(D0, D2)`, axis 2 yields
    /// `(D0, D1)`. The source volume is left untouched.
    pub fn slice_along(&self, axis: usize, index: usize) -> Result<Tensor<B, 2>> {
        let [d0, d1, d2] = self.shape();
        let bounds = [d0, d1, d2];
        if axis > 2 {
            return Err(CoreError::out_of_bounds(&[axis], &[3]));
        }
        if index >= bounds[axis] {
            let mut at = [0; 3];
            at[axis] = index;
            return Err(CoreError::out_of_bounds(&at, &bounds));
        }

        let plane = match axis {
            0 => self.data.clone().slice([index..index + 1, 0..d1, 0..d2]).reshape([d1, d2]),
            1 => self.data.clone().slice([0..d0, index..index + 1, 0..d2]).reshape([d0, d2]),
            _ => self.data.clone().slice([0..d0, 0..d1, index..index + 1]).reshape([d0, d1]),
        };
        Ok(plane)
    }

    /// Read a single sample, bounds-checked.
    pub fn voxel(&self, index: [usize; 3]) -> Result<f64> {
        let shape = self.shape();
        if index.iter().zip(shape.iter()).any(|(i, d)| i >= d) {
            return Err(CoreError::out_of_bounds(&index, &shape));
        }
        let [i, j, k] = index;
        let value = self
            .data
            .clone()
            .slice([i..i + 1, j..j + 1, k..k + 1])
            .into_scalar();
        Ok(value.elem::<f64>())
    }

    /// Copy all samples out in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.clone().into_data().iter::<f64>().collect()
    }
}

fn check_extents(shape: [usize; 3]) -> Result<()> {
    if shape.iter().any(|d| *d == 0) {
        return Err(CoreError::EmptyVolume {
            shape: shape.to_vec(),
        });
    }
    Ok(())
}

/// Copy a 2D tensor out in row-major order.
pub fn plane_to_vec<B: Backend>(plane: &Tensor<B, 2>) -> Vec<f64> {
    plane.clone().into_data().iter::<f64>().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn ramp(shape: [usize; 3]) -> Volume<TestBackend> {
        let n = shape.iter().product::<usize>();
        let values: Vec<f32> = (0..n).map(|v| v as f32).collect();
        Volume::from_vec(values, shape, &Default::default()).unwrap()
    }

    #[test]
    fn test_volume_creation() {
        let volume = ramp([2, 3, 4]);
        assert_eq!(volume.shape(), [2, 3, 4]);
        assert_eq!(volume.len(), 24);
        assert!(!volume.is_empty());
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Volume::<TestBackend>::from_vec(vec![0.0f32; 23], [2, 3, 4], &Default::default())
            .unwrap_err();
        assert_eq!(err, CoreError::shape_mismatch(&[24], &[23]));
    }

    #[test]
    fn test_zero_extent_rejected() {
        let err = Volume::<TestBackend>::zeros([0, 3, 4], &Default::default()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyVolume { .. }));
    }

    #[test]
    fn test_integer_samples_are_converted() {
        let volume =
            Volume::<TestBackend>::from_vec(vec![1u16, 2, 3, 4], [1, 2, 2], &Default::default()).unwrap();
        assert_eq!(volume.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_voxel_lookup() {
        let volume = ramp([2, 3, 4]);
        // (1, 2, 3) -> 1*12 + 2*4 + 3
        assert_eq!(volume.voxel([1, 2, 3]).unwrap(), 23.0);
        assert!(matches!(volume.voxel([2, 0, 0]), Err(CoreError::OutOfBounds { .. })));
    }

    #[test]
    fn test_slice_along_shapes() {
        let volume = ramp([2, 3, 4]);
        assert_eq!(volume.slice_along(0, 1).unwrap().dims(), [3, 4]);
        assert_eq!(volume.slice_along(1, 2).unwrap().dims(), [2, 4]);
        assert_eq!(volume.slice_along(2, 3).unwrap().dims(), [2, 3]);
    }

    #[test]
    fn test_slice_along_values() {
        let volume = ramp([2, 3, 4]);
        let plane = plane_to_vec(&volume.slice_along(2, 1).unwrap());
        // volume[:, :, 1]
        assert_eq!(plane, vec![1.0, 5.0, 9.0, 13.0, 17.0, 21.0]);
    }

    #[test]
    fn test_slice_along_out_of_bounds() {
        let volume = ramp([2, 3, 4]);
        let err = volume.slice_along(1, 3).unwrap_err();
        assert_eq!(err, CoreError::out_of_bounds(&[0, 3, 0], &[2, 3, 4]));
        assert!(volume.slice_along(3, 0).is_err());
    }
}
