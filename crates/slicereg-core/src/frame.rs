//! Conversions between voxel index space and physical space.
//!
//! Index space is `(i, j, k)`, physical space is `(x, y, z)` in µm. The axis
//! convention is fixed for the whole system: `x = j`, `y = -i`, `z = k`,
//! followed by an isotropic scale by the resolution. Atlas shared-space
//! transforms, section image placement and slicing all go through the
//! matrices defined here.

use crate::spatial::{AffineMatrix, Point3};

/// Fixed axis permutation mapping index `(i, j, k)` to physical `(x, y, z)`.
#[rustfmt::skip]
pub const AXIS_PERMUTATION: [f64; 16] = [
     0.0, 1.0, 0.0, 0.0,
    -1.0, 0.0, 0.0, 0.0,
     0.0, 0.0, 1.0, 0.0,
     0.0, 0.0, 0.0, 1.0,
];

/// The axis permutation as a matrix.
pub fn axis_permutation() -> AffineMatrix {
    AffineMatrix::from_row_slice(&AXIS_PERMUTATION)
}

/// Matrix mapping voxel index `(i, j, k, 1)` to physical `(x, y, z, 1)`.
///
/// Composed as `scale(resolution_um) · AXIS_PERMUTATION`.
pub fn index_to_physical(resolution_um: f64) -> AffineMatrix {
    AffineMatrix::scale(resolution_um) * axis_permutation()
}

/// Map a physical point to a continuous (unrounded) index.
///
/// Exact inverse of [`index_to_physical`]. Computed per axis by division so
/// that exact multiples of the resolution come back as exact integers.
pub fn physical_to_continuous_index(point: &Point3, resolution_um: f64) -> Point3 {
    Point3::new([
        -point[1] / resolution_um,
        point[0] / resolution_um,
        point[2] / resolution_um,
    ])
}

/// Map a physical point to the voxel containing it.
///
/// Returns `None` when the point lies outside the first octant of index
/// space, i.e. when any continuous index component is negative (`x < 0`,
/// `y > 0` or `z < 0`), or when a coordinate is not finite. Otherwise each
/// component is floored.
pub fn physical_to_index(point: &Point3, resolution_um: f64) -> Option<[usize; 3]> {
    let continuous = physical_to_continuous_index(point, resolution_um);
    if !continuous.is_finite() {
        return None;
    }
    let c = continuous.to_array();
    if c.iter().any(|v| *v < 0.0) {
        return None;
    }
    Some(c.map(|v| v.floor() as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_permutation_layout() {
        let p = axis_permutation();
        let xyz = p.transform_point(&Point3::new([1.0, 2.0, 3.0]));
        assert_eq!(xyz, Point3::new([2.0, -1.0, 3.0]));
    }

    #[test]
    fn test_index_to_physical_scales_after_permuting() {
        let m = index_to_physical(25.0);
        let xyz = m.transform_point(&Point3::new([10.0, 10.0, 10.0]));
        assert_eq!(xyz, Point3::new([250.0, -250.0, 250.0]));
    }

    #[test]
    fn test_physical_to_index_floors() {
        let ijk = physical_to_index(&Point3::new([49.0, -26.0, 74.9]), 25.0);
        assert_eq!(ijk, Some([1, 1, 2]));
    }

    #[test]
    fn test_physical_to_index_origin() {
        assert_eq!(physical_to_index(&Point3::origin(), 10.0), Some([0, 0, 0]));
        // -0.0 is not negative
        assert_eq!(physical_to_index(&Point3::new([0.0, -0.0, 0.0]), 10.0), Some([0, 0, 0]));
    }

    #[test]
    fn test_physical_to_index_rejects_outside_first_octant() {
        assert_eq!(physical_to_index(&Point3::new([-1.0, -10.0, 10.0]), 10.0), None);
        assert_eq!(physical_to_index(&Point3::new([10.0, 1.0, 10.0]), 10.0), None);
        assert_eq!(physical_to_index(&Point3::new([10.0, -10.0, -0.5]), 10.0), None);
        assert_eq!(physical_to_index(&Point3::new([f64::NAN, -10.0, 10.0]), 10.0), None);
    }
}
