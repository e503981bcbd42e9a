//! Homogeneous 4×4 affine matrices.
//!
//! Every transform in the crate acts on column vectors `(x, y, z, 1)` and is
//! composed by left-multiplication: `(a * b).transform_point(p)` applies `b`
//! first, then `a`.

use nalgebra::{Matrix3, Matrix4, Vector4};
use serde::{Deserialize, Serialize};

use super::Point3;

/// A 3D affine transform stored as a homogeneous 4×4 matrix.
///
/// The inner `Matrix4` is public for anything the constructors below do not
/// cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix(pub Matrix4<f64>);

impl AffineMatrix {
    /// Create the identity transform.
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Create a transform from a row-major list of the 16 matrix entries.
    pub fn from_row_slice(entries: &[f64; 16]) -> Self {
        Self(Matrix4::from_row_slice(entries))
    }

    /// Uniform scale `diag(s, s, s, 1)`.
    pub fn scale(factor: f64) -> Self {
        Self::scale_axes([factor, factor, factor])
    }

    /// Per-axis scale `diag(sx, sy, sz, 1)`.
    pub fn scale_axes(factors: [f64; 3]) -> Self {
        Self(Matrix4::from_diagonal(&Vector4::new(
            factors[0], factors[1], factors[2], 1.0,
        )))
    }

    /// Translation by `(x, y, z)`.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;
        Self(m)
    }

    /// Rotation about the x axis by `degrees`.
    pub fn rotation_x(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::from_linear(&Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, c, -s,
            0.0, s, c,
        ))
    }

    /// Rotation about the y axis by `degrees`.
    pub fn rotation_y(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::from_linear(&Matrix3::new(
            c, 0.0, s,
            0.0, 1.0, 0.0,
            -s, 0.0, c,
        ))
    }

    /// Rotation about the z axis by `degrees`.
    pub fn rotation_z(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::from_linear(&Matrix3::new(
            c, -s, 0.0,
            s, c, 0.0,
            0.0, 0.0, 1.0,
        ))
    }

    /// Rotation applying X first, then Y, then Z: `Rz · Ry · Rx`.
    pub fn rotation_xyz(rx: f64, ry: f64, rz: f64) -> Self {
        Self::rotation_z(rz) * Self::rotation_y(ry) * Self::rotation_x(rx)
    }

    /// Embed a 3×3 linear map with zero translation.
    pub fn from_linear(linear: &Matrix3<f64>) -> Self {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(linear);
        Self(m)
    }

    /// Try to compute the inverse transform.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        let h = self.0 * Vector4::new(point[0], point[1], point[2], 1.0);
        Point3::new([h.x, h.y, h.z])
    }

    /// The upper-left 3×3 block (rotation, scale, permutation).
    pub fn linear(&self) -> Matrix3<f64> {
        self.0.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation_part(&self) -> [f64; 3] {
        [self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)]]
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Index<(usize, usize)> for AffineMatrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl std::ops::Mul for AffineMatrix {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Self(self.0 * other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translation_moves_point() {
        let t = AffineMatrix::translation(1.0, -2.0, 3.0);
        let p = t.transform_point(&Point3::new([1.0, 1.0, 1.0]));
        assert_eq!(p, Point3::new([2.0, -1.0, 4.0]));
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        // x -> y, y -> -x
        let r = AffineMatrix::rotation_z(90.0);
        let p = r.transform_point(&Point3::new([1.0, 0.0, 0.0]));
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        // X(90) sends y to z, then Z(90) leaves z alone.
        let r = AffineMatrix::rotation_xyz(90.0, 0.0, 90.0);
        let p = r.transform_point(&Point3::new([0.0, 1.0, 0.0]));
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-12);

        // X(90) leaves x alone, then Z(90) sends it to y.
        let q = r.transform_point(&Point3::new([1.0, 0.0, 0.0]));
        assert_relative_eq!(q[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_composition_applies_right_operand_first() {
        let scale = AffineMatrix::scale(2.0);
        let shift = AffineMatrix::translation(1.0, 0.0, 0.0);
        let p = Point3::new([1.0, 0.0, 0.0]);
        assert_eq!((shift * scale).transform_point(&p)[0], 3.0);
        assert_eq!((scale * shift).transform_point(&p)[0], 4.0);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let m = AffineMatrix::translation(5.0, 6.0, 7.0)
            * AffineMatrix::rotation_xyz(10.0, 20.0, 30.0)
            * AffineMatrix::scale(25.0);
        let inv = m.try_inverse().unwrap();
        assert_relative_eq!((inv * m).0, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(AffineMatrix::scale(0.0).try_inverse().is_none());
    }

    #[test]
    fn test_linear_and_translation_parts() {
        let m = AffineMatrix::translation(1.0, 2.0, 3.0) * AffineMatrix::scale(4.0);
        assert_eq!(m.linear(), Matrix3::identity() * 4.0);
        assert_eq!(m.translation_part(), [1.0, 2.0, 3.0]);
    }
}
