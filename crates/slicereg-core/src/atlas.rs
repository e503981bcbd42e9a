//! Reference atlas volumes.
//!
//! An [`Atlas`] owns a reference volume, an optional annotation (label)
//! volume of identical shape, and an isotropic voxel size. It is replaced
//! wholesale on reload and never mutated.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{check_resolution, CoreError, Result};
use crate::frame;
use crate::spatial::{AffineMatrix, Point3};
use crate::volume::Volume;

/// The three orthogonal planes of a volume through one voxel.
#[derive(Debug, Clone)]
pub struct AtlasSections<B: Backend> {
    /// Voxel the planes pass through.
    pub index: [usize; 3],
    /// `volume[i, :, :]`, shape `(D1, D2)`.
    pub coronal: Tensor<B, 2>,
    /// `volume[:, j, :]`, shape `(D0, D2)`.
    pub axial: Tensor<B, 2>,
    /// `volume[:, :, k]`, shape `(D0, D1)`.
    pub sagittal: Tensor<B, 2>,
}

impl<B: Backend> AtlasSections<B> {
    fn of(volume: &Volume<B>, index: [usize; 3]) -> Result<Self> {
        let shape = volume.shape();
        if index.iter().zip(shape.iter()).any(|(i, d)| i >= d) {
            return Err(CoreError::out_of_bounds(&index, &shape));
        }
        let [i, j, k] = index;
        Ok(Self {
            index,
            coronal: volume.slice_along(0, i)?,
            axial: volume.slice_along(1, j)?,
            sagittal: volume.slice_along(2, k)?,
        })
    }
}

/// Reference brain atlas.
///
/// # Type Parameters
/// * `B` - The backend holding the volumes
#[derive(Debug, Clone)]
pub struct Atlas<B: Backend> {
    volume: Volume<B>,
    resolution_um: f64,
    annotation_volume: Option<Volume<B>>,
}

impl<B: Backend> Atlas<B> {
    /// Create an atlas without annotations.
    ///
    /// # Arguments
    /// * `volume` - Reference volume `(D0, D1, D2)`
    /// * `resolution_um` - Voxel size in µm, finite and > 0
    pub fn new(volume: Volume<B>, resolution_um: f64) -> Result<Self> {
        Ok(Self {
            volume,
            resolution_um: check_resolution(resolution_um)?,
            annotation_volume: None,
        })
    }

    /// New atlas with an annotation volume attached.
    ///
    /// Fails with [`CoreError::ShapeMismatch`] unless the annotation has the
    /// reference volume's shape.
    pub fn with_annotation(&self, annotation: Volume<B>) -> Result<Self> {
        check_same_shape(&self.volume, &annotation)?;
        Ok(Self {
            volume: self.volume.clone(),
            resolution_um: self.resolution_um,
            annotation_volume: Some(annotation),
        })
    }

    /// New atlas with the reference volume replaced.
    pub fn with_volume(&self, volume: Volume<B>) -> Result<Self> {
        if let Some(annotation) = &self.annotation_volume {
            check_same_shape(&volume, annotation)?;
        }
        Ok(Self {
            volume,
            resolution_um: self.resolution_um,
            annotation_volume: self.annotation_volume.clone(),
        })
    }

    /// New atlas with the voxel size replaced.
    pub fn with_resolution(&self, resolution_um: f64) -> Result<Self> {
        Ok(Self {
            volume: self.volume.clone(),
            resolution_um: check_resolution(resolution_um)?,
            annotation_volume: self.annotation_volume.clone(),
        })
    }

    pub fn volume(&self) -> &Volume<B> {
        &self.volume
    }

    pub fn annotation_volume(&self) -> Option<&Volume<B>> {
        self.annotation_volume.as_ref()
    }

    pub fn resolution_um(&self) -> f64 {
        self.resolution_um
    }

    pub fn shape(&self) -> [usize; 3] {
        self.volume.shape()
    }

    /// `diag(r, r, r, 1)`.
    pub fn scale_matrix(&self) -> AffineMatrix {
        AffineMatrix::scale(self.resolution_um)
    }

    /// Voxel index to shared physical space: `scale_matrix · AXIS_PERMUTATION`.
    pub fn shared_space_transform(&self) -> AffineMatrix {
        self.scale_matrix() * frame::axis_permutation()
    }

    /// Centre of the volume in shared physical space.
    ///
    /// The far corner index `(D0, D1, D2)` mapped to physical space, halved.
    pub fn center(&self) -> Point3 {
        let corner = Point3::from_index(self.shape());
        self.shared_space_transform().transform_point(&corner).scaled(0.5)
    }

    /// Voxel containing a physical point.
    ///
    /// `None` (not an error) when the point is outside the first octant of
    /// index space. The guard is on the index components, so `y > 0` is
    /// outside while every in-atlas point has `y <= 0`.
    pub fn map_physical_to_index(&self, point: &Point3) -> Option<[usize; 3]> {
        frame::physical_to_index(point, self.resolution_um)
    }

    /// Reference sample at a voxel; `OutOfBounds` past the volume edge.
    pub fn voxel_value(&self, index: [usize; 3]) -> Result<f64> {
        self.volume.voxel(index)
    }

    /// Coronal, axial and sagittal planes of the reference volume through a point.
    ///
    /// `Ok(None)` when the point is outside the first octant;
    /// `Err(OutOfBounds)` when it maps past the upper edge of the volume.
    pub fn orthogonal_sections_at(&self, point: &Point3) -> Result<Option<AtlasSections<B>>> {
        self.sections_of(&self.volume, point)
    }

    /// Same as [`orthogonal_sections_at`](Self::orthogonal_sections_at) for the
    /// annotation volume; `Ok(None)` if there is none.
    pub fn annotation_sections_at(&self, point: &Point3) -> Result<Option<AtlasSections<B>>> {
        match &self.annotation_volume {
            Some(annotation) => self.sections_of(annotation, point),
            None => Ok(None),
        }
    }

    fn sections_of(&self, volume: &Volume<B>, point: &Point3) -> Result<Option<AtlasSections<B>>> {
        match self.map_physical_to_index(point) {
            Some(index) => AtlasSections::of(volume, index).map(Some),
            None => Ok(None),
        }
    }
}

fn check_same_shape<B: Backend>(expected: &Volume<B>, actual: &Volume<B>) -> Result<()> {
    if expected.shape() != actual.shape() {
        return Err(CoreError::shape_mismatch(&expected.shape(), &actual.shape()));
    }
    Ok(())
}
