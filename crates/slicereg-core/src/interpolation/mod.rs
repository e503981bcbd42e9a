//! Interpolation types and operations.
//!
//! This module provides interpolation traits and implementations
//! for sampling volumes at continuous voxel indices.

pub mod linear;
pub mod nearest;
pub mod trait_;

pub use linear::LinearInterpolator;
pub use nearest::NearestNeighborInterpolator;
pub use trait_::Interpolator;
