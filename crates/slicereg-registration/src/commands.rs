//! Command layer.
//!
//! Each command borrows a repository, resolves the current atlas and/or
//! section from it, runs one core operation, and stores the result back.
//! Missing state is reported as [`RegistrationError::NoAtlasLoaded`] or
//! [`RegistrationError::NoSectionLoaded`]; nothing is changed in that case.
//!
//! Commands that modify the current section do so through
//! [`SectionRepo::update_section`], so concurrent writers never lose an
//! update. Commands that read both the atlas and the section take two
//! independent snapshots; callers that swap the atlas while registering get
//! either the old or the new atlas, each complete.

use std::sync::Arc;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use slicereg_core::{AffineMatrix, Atlas, AtlasSections, Image, Orientation, PoseUpdate, Section};

use crate::error::{RegistrationError, Result};
use crate::registration::Registration;
use crate::repo::{AtlasRepo, SectionRepo};

/// Atlas voxel under the section centre, one index per orthogonal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasImageCoords {
    pub coronal: usize,
    pub axial: usize,
    pub sagittal: usize,
}

impl From<[usize; 3]> for AtlasImageCoords {
    fn from([coronal, axial, sagittal]: [usize; 3]) -> Self {
        Self {
            coronal,
            axial,
            sagittal,
        }
    }
}

/// Output of [`RegisterSection`].
#[derive(Debug, Clone)]
pub struct RegisterSectionData<B: Backend> {
    /// Atlas reference volume sliced along the section plane, `(H, W)`.
    pub atlas_slice_image: Tensor<B, 2>,
    /// Section pixel index to atlas voxel index.
    pub section_transform: AffineMatrix,
    /// `None` when the section centre lies outside the atlas.
    pub atlas_image_coords: Option<AtlasImageCoords>,
}

fn current_section<B: Backend, R: SectionRepo<B>>(repo: &R) -> Result<Arc<Section<B>>> {
    repo.get_section().ok_or_else(|| {
        tracing::warn!("no section loaded");
        RegistrationError::NoSectionLoaded
    })
}

fn warn_if_missing<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        if err.is_missing_state() {
            tracing::warn!("{}", err);
        }
    }
    result
}

fn current_atlas<B: Backend, R: AtlasRepo<B>>(repo: &R) -> Result<Arc<Atlas<B>>> {
    repo.get_atlas().ok_or_else(|| {
        tracing::warn!("no atlas loaded");
        RegistrationError::NoAtlasLoaded
    })
}

/// Slice the current atlas along the current section.
#[derive(Debug, Clone, Copy)]
pub struct RegisterSection<'r, R> {
    repo: &'r R,
}

impl<'r, R> RegisterSection<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// The section is checked before the atlas.
    pub fn execute<B: Backend>(&self) -> Result<RegisterSectionData<B>>
    where
        R: AtlasRepo<B> + SectionRepo<B>,
    {
        let section = current_section(self.repo)?;
        let atlas = current_atlas(self.repo)?;
        let registration = Registration::new(&section, &atlas)?;
        let slice = registration.slice_atlas()?;
        let data = RegisterSectionData {
            atlas_slice_image: slice.channel(0)?,
            section_transform: *registration.image_to_volume_transform(),
            atlas_image_coords: registration.section_center_index().map(AtlasImageCoords::from),
        };
        tracing::info!(coords = ?data.atlas_image_coords, "registered section");
        Ok(data)
    }
}

/// Make an image the current section.
#[derive(Debug, Clone, Copy)]
pub struct LoadSection<'r, R> {
    repo: &'r R,
}

impl<'r, R> LoadSection<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Centres the new section on the atlas when one is loaded; otherwise it
    /// keeps the identity pose.
    pub fn execute<B: Backend>(&self, image: Image<B>) -> Arc<Section<B>>
    where
        R: AtlasRepo<B> + SectionRepo<B>,
    {
        let section = Section::new(image);
        let section = match self.repo.get_atlas() {
            Some(atlas) => section.centered_on(&atlas.center()),
            None => section,
        };
        tracing::info!(
            channels = section.image().num_channels(),
            rows = section.image().height(),
            cols = section.image().width(),
            resolution_um = section.image().resolution_um(),
            pose = ?section.pose(),
            "loaded section"
        );
        self.repo.save_section(section)
    }
}

/// Change pose fields or pixel size of the current section.
#[derive(Debug, Clone, Copy)]
pub struct UpdateSection<'r, R> {
    repo: &'r R,
}

impl<'r, R> UpdateSection<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Replace the pose fields `update` sets.
    pub fn execute<B: Backend>(&self, update: &PoseUpdate) -> Result<Arc<Section<B>>>
    where
        R: SectionRepo<B>,
    {
        let updated = warn_if_missing(self.repo.update_section(|section| Ok(section.update_pose(update))))?;
        tracing::info!(pose = ?updated.pose(), "updated section pose");
        Ok(updated)
    }

    /// Relabel the pixel size without touching the pixels.
    pub fn set_resolution<B: Backend>(&self, resolution_um: f64) -> Result<Arc<Section<B>>>
    where
        R: SectionRepo<B>,
    {
        let updated =
            warn_if_missing(self.repo.update_section(|section| Ok(section.with_resolution(resolution_um)?)))?;
        tracing::info!(resolution_um, "updated section resolution");
        Ok(updated)
    }
}

/// Rotate the current section to an anatomical plane preset.
#[derive(Debug, Clone, Copy)]
pub struct OrientSection<'r, R> {
    repo: &'r R,
}

impl<'r, R> OrientSection<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// With an atlas loaded the section is re-centred on the atlas centre
    /// under the new rotation; otherwise the translation is kept.
    pub fn execute<B: Backend>(&self, orientation: Orientation) -> Result<Arc<Section<B>>>
    where
        R: AtlasRepo<B> + SectionRepo<B>,
    {
        let center = self.repo.get_atlas().map(|atlas| atlas.center());
        let oriented = warn_if_missing(self.repo.update_section(|section| {
            let oriented = section.oriented(orientation);
            Ok(match &center {
                Some(center) => oriented.centered_on(center),
                None => oriented,
            })
        }))?;
        tracing::info!(?orientation, pose = ?oriented.pose(), "oriented section");
        Ok(oriented)
    }
}

/// Resample the current section image to a new pixel size.
#[derive(Debug, Clone, Copy)]
pub struct ResampleSection<'r, R> {
    repo: &'r R,
}

impl<'r, R> ResampleSection<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// The pose is kept.
    pub fn execute<B: Backend>(&self, resolution_um: f64) -> Result<Arc<Section<B>>>
    where
        R: SectionRepo<B>,
    {
        let resampled = warn_if_missing(
            self.repo
                .update_section(|section| Ok(section.with_image(section.image().resample(resolution_um)?))),
        )?;
        tracing::info!(
            resolution_um,
            rows = resampled.image().height(),
            cols = resampled.image().width(),
            "resampled section"
        );
        Ok(resampled)
    }
}

/// Make an atlas the current atlas.
#[derive(Debug, Clone, Copy)]
pub struct LoadAtlas<'r, R> {
    repo: &'r R,
}

impl<'r, R> LoadAtlas<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    pub fn execute<B: Backend>(&self, atlas: Atlas<B>) -> Arc<Atlas<B>>
    where
        R: AtlasRepo<B>,
    {
        tracing::info!(
            shape = ?atlas.shape(),
            resolution_um = atlas.resolution_um(),
            annotated = atlas.annotation_volume().is_some(),
            "loaded atlas"
        );
        self.repo.set_atlas(atlas)
    }
}

/// Orthogonal atlas planes through the current section's centre.
#[derive(Debug, Clone, Copy)]
pub struct AtlasSectionsAtSection<'r, R> {
    repo: &'r R,
}

impl<'r, R> AtlasSectionsAtSection<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// `Ok(None)` when the centre is outside the first octant of the atlas.
    pub fn execute<B: Backend>(&self) -> Result<Option<AtlasSections<B>>>
    where
        R: AtlasRepo<B> + SectionRepo<B>,
    {
        let section = current_section(self.repo)?;
        let atlas = current_atlas(self.repo)?;
        let center = section.center_position();
        let sections = atlas.orthogonal_sections_at(&center)?;
        tracing::debug!(index = ?sections.as_ref().map(|s| s.index), "atlas sections at section centre");
        Ok(sections)
    }
}
