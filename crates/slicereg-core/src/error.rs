//! Error types for atlas, section and volume construction.
//!
//! Construction failures are reported as explicit values. Per-sample
//! out-of-range lookups during resampling never reach this type; they are
//! masked to a background value by the interpolators.

use thiserror::Error;

/// Main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Buffer length or companion volume does not match the declared shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Volume with a zero extent along some axis.
    #[error("Empty volume: shape {shape:?} has a zero extent")]
    EmptyVolume { shape: Vec<usize> },

    /// Resolution that is not a finite, strictly positive number.
    #[error("Invalid resolution: {0} um (must be finite and > 0)")]
    InvalidResolution(f64),

    /// Explicit index lookup at or past the upper edge of a volume.
    #[error("Index {index:?} out of bounds for shape {shape:?}")]
    OutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// Channel lookup past the number of image channels.
    #[error("Channel {channel} out of range for image with {channels} channel(s)")]
    ChannelOutOfRange { channel: usize, channels: usize },

    /// Transform that cannot be inverted.
    #[error("Singular transform: {0}")]
    SingularTransform(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create an out-of-bounds error.
    pub fn out_of_bounds(index: &[usize], shape: &[usize]) -> Self {
        Self::OutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        }
    }

    /// Create a singular transform error.
    pub fn singular_transform(msg: impl Into<String>) -> Self {
        Self::SingularTransform(msg.into())
    }
}

/// Check that a resolution is usable as a voxel or pixel size.
pub(crate) fn check_resolution(resolution_um: f64) -> Result<f64> {
    if resolution_um.is_finite() && resolution_um > 0.0 {
        Ok(resolution_um)
    } else {
        Err(CoreError::InvalidResolution(resolution_um))
    }
}
