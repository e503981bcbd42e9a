//! Atlas slicing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RegistrationError, Result};

/// Sampler used for reference layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Nearest voxel, rounding half away from zero.
    #[default]
    Nearest,
    /// Trilinear blend of the eight surrounding voxels.
    Linear,
}

/// Atlas volume sampled into one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtlasLayer {
    /// The reference (intensity) volume.
    Reference,
    /// The annotation (label) volume. Always sampled nearest-neighbour.
    Annotation,
}

/// Slicing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceConfig {
    /// Output `[rows, cols]`; `None` uses the section image size.
    pub canvas: Option<[usize; 2]>,
    /// Value for pixels that map outside the atlas.
    pub background: f64,
    /// Sampler for reference layers.
    pub interpolation: Interpolation,
    /// Layers to sample, one output channel each, in order.
    pub layers: Vec<AtlasLayer>,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            canvas: None,
            background: 0.0,
            interpolation: Interpolation::Nearest,
            layers: vec![AtlasLayer::Reference],
        }
    }
}

impl SliceConfig {
    /// Create a new slice config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit output canvas.
    pub fn with_canvas(mut self, rows: usize, cols: usize) -> Self {
        self.canvas = Some([rows, cols]);
        self
    }

    /// Use the section image size as canvas.
    pub fn without_canvas(mut self) -> Self {
        self.canvas = None;
        self
    }

    /// Set the background value.
    pub fn with_background(mut self, background: f64) -> Self {
        self.background = background;
        self
    }

    /// Set the reference sampler.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Replace the layer stack.
    pub fn with_layers(mut self, layers: impl Into<Vec<AtlasLayer>>) -> Self {
        self.layers = layers.into();
        self
    }

    /// Canvas size for a section image of `[height, width]`.
    pub fn canvas_for(&self, image_size: [usize; 2]) -> [usize; 2] {
        self.canvas.unwrap_or(image_size)
    }

    /// Whether any layer reads the annotation volume.
    pub fn needs_annotation(&self) -> bool {
        self.layers.contains(&AtlasLayer::Annotation)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(RegistrationError::invalid_configuration("no atlas layers selected"));
        }
        if let Some([rows, cols]) = self.canvas {
            if rows == 0 || cols == 0 {
                return Err(RegistrationError::invalid_configuration(format!(
                    "canvas {}x{} has a zero extent",
                    rows, cols
                )));
            }
        }
        if !self.background.is_finite() {
            return Err(RegistrationError::invalid_configuration(format!(
                "background {} is not finite",
                self.background
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_samples_reference_nearest() {
        let config = SliceConfig::default();
        assert_eq!(config.layers, vec![AtlasLayer::Reference]);
        assert_eq!(config.interpolation, Interpolation::Nearest);
        assert_eq!(config.background, 0.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas_for([7, 9]), [7, 9]);
    }

    #[test]
    fn test_builder() {
        let config = SliceConfig::new()
            .with_canvas(3, 4)
            .with_background(-1.0)
            .with_interpolation(Interpolation::Linear)
            .with_layers([AtlasLayer::Reference, AtlasLayer::Annotation]);
        assert_eq!(config.canvas_for([7, 9]), [3, 4]);
        assert!(config.needs_annotation());
        assert_eq!(config.clone().without_canvas().canvas, None);
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let empty = SliceConfig::new().with_layers(Vec::new());
        assert!(matches!(empty.validate(), Err(RegistrationError::InvalidConfiguration(_))));
        assert!(SliceConfig::new().with_canvas(0, 4).validate().is_err());
        assert!(SliceConfig::new().with_background(f64::NAN).validate().is_err());
    }
}
