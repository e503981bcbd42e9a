//! Section-to-atlas registration.
//!
//! A [`Registration`] borrows one section and one atlas, composes the
//! transform from section pixel indices to atlas voxel indices, and slices
//! the atlas along the section's plane by inverse mapping.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use slicereg_core::filter::ResampleImageFilter;
use slicereg_core::interpolation::{Interpolator, LinearInterpolator, NearestNeighborInterpolator};
use slicereg_core::{AffineMatrix, Atlas, CoreError, Image, Section, Volume};

use crate::config::{AtlasLayer, Interpolation, SliceConfig};
use crate::error::{RegistrationError, Result};

/// A section placed against an atlas.
///
/// # Type Parameters
/// * `B` - The backend holding section and atlas data
#[derive(Debug, Clone)]
pub struct Registration<'a, B: Backend> {
    section: &'a Section<B>,
    atlas: &'a Atlas<B>,
    image_to_volume: AffineMatrix,
}

impl<'a, B: Backend> Registration<'a, B> {
    /// Compose the section-pixel to atlas-voxel transform.
    ///
    /// `inverse(atlas.shared_space_transform) · pose.affine · image.index_to_physical`
    pub fn new(section: &'a Section<B>, atlas: &'a Atlas<B>) -> Result<Self> {
        let shared_to_volume = atlas.shared_space_transform().try_inverse().ok_or_else(|| {
            CoreError::singular_transform(format!(
                "atlas shared space transform at {} um",
                atlas.resolution_um()
            ))
        })?;
        let image_to_volume = shared_to_volume * section.image_to_shared();
        tracing::debug!(pose = ?section.pose(), transform = ?image_to_volume, "composed image to volume transform");
        Ok(Self {
            section,
            atlas,
            image_to_volume,
        })
    }

    pub fn section(&self) -> &Section<B> {
        self.section
    }

    pub fn atlas(&self) -> &Atlas<B> {
        self.atlas
    }

    /// Section pixel `(0, row, col)` to continuous atlas voxel index.
    pub fn image_to_volume_transform(&self) -> &AffineMatrix {
        &self.image_to_volume
    }

    /// Slice the reference volume onto the section image grid.
    ///
    /// Nearest-neighbour, background 0, one channel at the section's resolution.
    pub fn slice_atlas(&self) -> Result<Image<B>> {
        self.slice_atlas_with(&SliceConfig::default())
    }

    /// Slice the atlas with explicit canvas, background, sampler and layers.
    ///
    /// Each configured layer becomes one output channel, in order.
    pub fn slice_atlas_with(&self, config: &SliceConfig) -> Result<Image<B>> {
        config.validate()?;
        let image = self.section.image();
        let [rows, cols] = config.canvas_for([image.height(), image.width()]);

        let mut planes = Vec::with_capacity(config.layers.len());
        for layer in &config.layers {
            let plane = match layer {
                AtlasLayer::Reference => match config.interpolation {
                    Interpolation::Nearest => {
                        self.sample(self.atlas.volume(), [rows, cols], config.background, NearestNeighborInterpolator)
                    }
                    Interpolation::Linear => {
                        self.sample(self.atlas.volume(), [rows, cols], config.background, LinearInterpolator)
                    }
                },
                AtlasLayer::Annotation => {
                    let annotation = self
                        .atlas
                        .annotation_volume()
                        .ok_or(RegistrationError::MissingAnnotation)?;
                    self.sample(annotation, [rows, cols], config.background, NearestNeighborInterpolator)
                }
            };
            planes.push(plane.reshape([1, rows, cols]));
        }

        tracing::debug!(
            rows,
            cols,
            layers = config.layers.len(),
            interpolation = ?config.interpolation,
            "sliced atlas"
        );
        let channels = Volume::from_tensor(Tensor::cat(planes, 0))?;
        Ok(Image::new(channels, image.resolution_um())?)
    }

    /// Atlas voxel under the section's centre pixel, if inside the atlas.
    pub fn section_center_index(&self) -> Option<[usize; 3]> {
        let center = self.section.center_position();
        let shape = self.atlas.shape();
        self.atlas
            .map_physical_to_index(&center)
            .filter(|index| index.iter().zip(shape.iter()).all(|(i, d)| i < d))
    }

    fn sample<I: Interpolator<B>>(
        &self,
        volume: &Volume<B>,
        size: [usize; 2],
        background: f64,
        interpolator: I,
    ) -> Tensor<B, 2> {
        ResampleImageFilter::new(size, self.image_to_volume, interpolator)
            .with_default_pixel_value(background)
            .apply(volume.data())
    }
}
