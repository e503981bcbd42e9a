//! Core data model for registering 2D microscopy sections into a 3D atlas.
//!
//! Volumes, atlases and sections are immutable values; every update builds a
//! new value. Index and physical coordinates are related through the fixed
//! axis convention in [`frame`].

pub mod atlas;
pub mod error;
pub mod filter;
pub mod frame;
pub mod image;
pub mod interpolation;
pub mod section;
pub mod spatial;
pub mod volume;

pub use atlas::{Atlas, AtlasSections};
pub use error::{CoreError, Result};
pub use image::Image;
pub use section::{Orientation, Pose, PoseUpdate, Section};
pub use spatial::{AffineMatrix, Point, Point3};
pub use volume::Volume;
