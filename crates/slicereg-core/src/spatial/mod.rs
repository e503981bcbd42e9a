//! Spatial types for representing points and homogeneous affine matrices.
//!
//! All types are based on nalgebra and use f64 throughout.

pub mod affine;
pub mod point;

pub use affine::AffineMatrix;
pub use point::Point;

pub type Point3 = Point<3>;
