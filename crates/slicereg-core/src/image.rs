//! Section image type.
//!
//! An [`Image`] is a stack of channels `(C, H, W)` with an isotropic pixel
//! size. Pixel `(row, col)` of any channel is the voxel `(0, row, col)` of a
//! one-plane slab, so the image shares the index-to-physical convention of
//! [`frame`](crate::frame): rows run along physical `x`, columns along
//! physical `z`, and the through-plane axis is physical `y`.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{check_resolution, CoreError, Result};
use crate::filter::ResampleImageFilter;
use crate::frame;
use crate::interpolation::NearestNeighborInterpolator;
use crate::spatial::AffineMatrix;
use crate::volume::Volume;

/// Multi-channel 2D image with physical pixel size.
///
/// # Type Parameters
/// * `B` - The backend holding the channel data
#[derive(Debug, Clone)]
pub struct Image<B: Backend> {
    channels: Volume<B>,
    resolution_um: f64,
}

impl<B: Backend> Image<B> {
    /// Create a new image.
    ///
    /// # Arguments
    /// * `channels` - Channel stack `(C, H, W)`
    /// * `resolution_um` - Pixel size in µm, finite and > 0
    pub fn new(channels: Volume<B>, resolution_um: f64) -> Result<Self> {
        Ok(Self {
            channels,
            resolution_um: check_resolution(resolution_um)?,
        })
    }

    /// Get the channel stack.
    pub fn channels(&self) -> &Volume<B> {
        &self.channels
    }

    /// Pixel size in µm.
    pub fn resolution_um(&self) -> f64 {
        self.resolution_um
    }

    pub fn num_channels(&self) -> usize {
        self.channels.shape()[0]
    }

    pub fn height(&self) -> usize {
        self.channels.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.channels.shape()[2]
    }

    /// Get one channel as an `(H, W)` plane.
    pub fn channel(&self, channel: usize) -> Result<Tensor<B, 2>> {
        let channels = self.num_channels();
        if channel >= channels {
            return Err(CoreError::ChannelOutOfRange { channel, channels });
        }
        self.channels.slice_along(0, channel)
    }

    /// New image with the channels replaced.
    pub fn with_channels(&self, channels: Volume<B>) -> Self {
        Self {
            channels,
            resolution_um: self.resolution_um,
        }
    }

    /// New image with the pixel size replaced. Pixels are not resampled.
    pub fn with_resolution(&self, resolution_um: f64) -> Result<Self> {
        Self::new(self.channels.clone(), resolution_um)
    }

    /// Matrix mapping pixel `(0, row, col)` to image-local physical µm.
    pub fn index_to_physical(&self) -> AffineMatrix {
        frame::index_to_physical(self.resolution_um)
    }

    /// Rescale every channel to a new pixel size with nearest-neighbour sampling.
    ///
    /// Each in-plane extent becomes `max(1, round(extent * old / new))`.
    /// Output pixel centres are mapped onto source pixel centres using the
    /// realised per-axis ratio `extent / new_extent`, so every output pixel
    /// lands inside the source image.
    pub fn resample(&self, resolution_um: f64) -> Result<Self> {
        let resolution_um = check_resolution(resolution_um)?;
        let factor = resolution_um / self.resolution_um;
        let rescale = |extent: usize| ((extent as f64 / factor).round() as usize).max(1);
        let size = [rescale(self.height()), rescale(self.width())];

        // source = (dst + 0.5) * ratio - 0.5
        let ratio_rows = self.height() as f64 / size[0] as f64;
        let ratio_cols = self.width() as f64 / size[1] as f64;
        let planes = (0..self.num_channels())
            .map(|c| {
                let transform =
                    AffineMatrix::translation(c as f64, 0.5 * ratio_rows - 0.5, 0.5 * ratio_cols - 0.5)
                        * AffineMatrix::scale_axes([1.0, ratio_rows, ratio_cols]);
                let plane = ResampleImageFilter::new(size, transform, NearestNeighborInterpolator)
                    .apply(self.channels.data());
                plane.reshape([1, size[0], size[1]])
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            from = self.resolution_um,
            to = resolution_um,
            rows = size[0],
            cols = size[1],
            "resampled section image"
        );
        Self::new(Volume::from_tensor(Tensor::cat(planes, 0))?, resolution_um)
    }
}
