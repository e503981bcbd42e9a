//! Sections and their placement in shared physical space.
//!
//! A [`Section`] is a section [`Image`] plus a rigid-body [`Pose`]. The pose
//! rotates the image about its local origin (pixel `(0, 0)`) applying X, then
//! Y, then Z, and then translates it. All updates return new values.

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::Image;
use crate::spatial::{AffineMatrix, Point3};

/// Rigid-body placement of a section: translation in µm, rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl Pose {
    /// Pose at the origin with no rotation.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Pose with translation only.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, ..Self::default() }
    }

    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    pub fn with_rx(self, rx: f64) -> Self {
        Self { rx, ..self }
    }

    pub fn with_ry(self, ry: f64) -> Self {
        Self { ry, ..self }
    }

    pub fn with_rz(self, rz: f64) -> Self {
        Self { rz, ..self }
    }

    /// Translation part as a point.
    pub fn position(&self) -> Point3 {
        Point3::new([self.x, self.y, self.z])
    }

    /// New pose with the translation replaced.
    pub fn with_position(self, position: &Point3) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            ..self
        }
    }

    /// Replace every field that `update` sets.
    pub fn apply(self, update: &PoseUpdate) -> Self {
        Self {
            x: update.x.unwrap_or(self.x),
            y: update.y.unwrap_or(self.y),
            z: update.z.unwrap_or(self.z),
            rx: update.rx.unwrap_or(self.rx),
            ry: update.ry.unwrap_or(self.ry),
            rz: update.rz.unwrap_or(self.rz),
        }
    }

    /// Rotation `Rz · Ry · Rx`, degrees converted to radians.
    pub fn rotation_matrix(&self) -> AffineMatrix {
        AffineMatrix::rotation_xyz(self.rx, self.ry, self.rz)
    }

    /// Section-local physical to shared physical: rotate, then translate.
    pub fn affine(&self) -> AffineMatrix {
        AffineMatrix::translation(self.x, self.y, self.z) * self.rotation_matrix()
    }

    /// New pose with the rotation of an orientation preset; translation kept.
    pub fn oriented(self, orientation: Orientation) -> Self {
        let [rx, ry, rz] = orientation.rotation();
        Self { rx, ry, rz, ..self }
    }
}

/// Partial pose update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
    pub rz: Option<f64>,
}

impl PoseUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn rx(mut self, rx: f64) -> Self {
        self.rx = Some(rx);
        self
    }

    pub fn ry(mut self, ry: f64) -> Self {
        self.ry = Some(ry);
        self
    }

    pub fn rz(mut self, rz: f64) -> Self {
        self.rz = Some(rz);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Standard anatomical plane orientations for a section.
///
/// An unrotated section lies across atlas index axis 0 (physical `y`), the
/// coronal plane. The presets turn that normal onto the axis each named
/// plane is cut across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Plane of constant atlas index `i`.
    Coronal,
    /// Plane of constant atlas index `j`.
    Axial,
    /// Plane of constant atlas index `k`.
    Sagittal,
}

impl Orientation {
    /// `[rx, ry, rz]` in degrees.
    pub fn rotation(&self) -> [f64; 3] {
        match self {
            Orientation::Coronal => [0.0, 0.0, 0.0],
            Orientation::Axial => [0.0, 0.0, -90.0],
            Orientation::Sagittal => [90.0, 0.0, 0.0],
        }
    }
}

/// A section image placed in shared physical space.
///
/// # Type Parameters
/// * `B` - The backend holding the image data
#[derive(Debug, Clone)]
pub struct Section<B: Backend> {
    image: Image<B>,
    pose: Pose,
}

impl<B: Backend> Section<B> {
    /// Create a section with the identity pose.
    pub fn new(image: Image<B>) -> Self {
        Self::with_initial_pose(image, Pose::identity())
    }

    /// Create a section with a given pose.
    pub fn with_initial_pose(image: Image<B>, pose: Pose) -> Self {
        Self { image, pose }
    }

    pub fn image(&self) -> &Image<B> {
        &self.image
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// New section with the image replaced; pose kept.
    pub fn with_image(&self, image: Image<B>) -> Self {
        Self {
            image,
            pose: self.pose,
        }
    }

    /// New section with the pose replaced; image kept.
    pub fn with_pose(&self, pose: Pose) -> Self {
        Self {
            image: self.image.clone(),
            pose,
        }
    }

    /// New section with some pose fields replaced.
    pub fn update_pose(&self, update: &PoseUpdate) -> Self {
        self.with_pose(self.pose.apply(update))
    }

    /// New section rotated to an orientation preset.
    pub fn oriented(&self, orientation: Orientation) -> Self {
        self.with_pose(self.pose.oriented(orientation))
    }

    /// New section with the image pixel size replaced (pixels untouched).
    pub fn with_resolution(&self, resolution_um: f64) -> Result<Self> {
        Ok(self.with_image(self.image.with_resolution(resolution_um)?))
    }

    /// Pixel index `(0, H/2, W/2)` of the image centre.
    pub fn center_pixel(&self) -> Point3 {
        Point3::from_index([0, self.image.height() / 2, self.image.width() / 2])
    }

    /// Pixel index `(0, row, col)` to shared physical µm.
    pub fn image_to_shared(&self) -> AffineMatrix {
        self.pose.affine() * self.image.index_to_physical()
    }

    /// Shared physical position of the image centre.
    pub fn center_position(&self) -> Point3 {
        self.image_to_shared().transform_point(&self.center_pixel())
    }

    /// New section translated so the image centre sits at `point`.
    ///
    /// The current rotation is kept.
    pub fn centered_on(&self, point: &Point3) -> Self {
        let local = self.image.index_to_physical().transform_point(&self.center_pixel());
        let rotated = self.pose.rotation_matrix().transform_point(&local);
        let position = Point3::new([
            point[0] - rotated[0],
            point[1] - rotated[1],
            point[2] - rotated[2],
        ]);
        self.with_pose(self.pose.with_position(&position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Volume;
    use approx::assert_relative_eq;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn section(shape: [usize; 3], resolution_um: f64) -> Section<TestBackend> {
        let channels = Volume::zeros(shape, &Default::default()).unwrap();
        Section::new(Image::new(channels, resolution_um).unwrap())
    }

    #[test]
    fn test_new_section_has_identity_pose() {
        assert_eq!(*section([1, 4, 4], 10.0).pose(), Pose::identity());
    }

    #[test]
    fn test_pose_with_changes_one_field() {
        let pose = Pose::at(1.0, 2.0, 3.0).with_rx(10.0);
        let moved = pose.with_z(30.0);
        assert_eq!(moved, Pose { z: 30.0, ..pose });
        assert_eq!(pose.z, 3.0);
    }

    #[test]
    fn test_pose_apply_update() {
        let pose = Pose::at(1.0, 2.0, 3.0);
        let updated = pose.apply(&PoseUpdate::new().y(20.0).rz(45.0));
        assert_eq!(updated, Pose { y: 20.0, rz: 45.0, ..pose });
        assert!(PoseUpdate::new().is_empty());
        assert!(!PoseUpdate::new().x(0.0).is_empty());
    }

    #[test]
    fn test_pose_affine_rotates_then_translates() {
        let pose = Pose::at(100.0, 0.0, 0.0).with_rz(90.0);
        let p = pose.affine().transform_point(&Point3::new([1.0, 0.0, 0.0]));
        assert_relative_eq!(p[0], 100.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_keeps_translation() {
        let pose = Pose::at(1.0, 2.0, 3.0).with_ry(15.0).oriented(Orientation::Sagittal);
        assert_eq!(pose, Pose { rx: 90.0, ..Pose::at(1.0, 2.0, 3.0) });
    }

    #[test]
    fn test_section_update_pose_leaves_image() {
        let s = section([2, 3, 4], 12.0);
        let moved = s.update_pose(&PoseUpdate::new().x(5.0));
        assert_eq!(moved.pose().x, 5.0);
        assert_eq!(s.pose().x, 0.0);
        assert_eq!(moved.image().resolution_um(), 12.0);
        assert_eq!(moved.image().channels().shape(), [2, 3, 4]);
    }

    #[test]
    fn test_centered_on_places_center_pixel() {
        let s = section([1, 10, 10], 25.0).with_pose(Pose::identity().with_rx(30.0).with_rz(-20.0));
        let target = Point3::new([125.0, -125.0, 125.0]);
        let centred = s.centered_on(&target);
        let c = centred.center_position();
        for axis in 0..3 {
            assert_relative_eq!(c[axis], target[axis], epsilon = 1e-9);
        }
        assert_eq!(centred.pose().rx, 30.0);
    }

    #[test]
    fn test_centered_on_unrotated_is_exact() {
        let s = section([1, 10, 10], 25.0).centered_on(&Point3::new([125.0, -125.0, 125.0]));
        assert_eq!(*s.pose(), Pose::at(0.0, -125.0, 0.0));
    }
}
