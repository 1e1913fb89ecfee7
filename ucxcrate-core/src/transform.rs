//! 3D transformation utilities

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use nalgebra::{Isometry3, Matrix4, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// An affine transformation mapping a local space into its parent (or world) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f64>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3d) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Create a scaling transformation
    pub fn scaling(scale: Vector3d) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&scale),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Create a transformation from translation and rotation
    pub fn from_translation_rotation(
        translation: Vector3d,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        let isometry = Isometry3::from_parts(translation.into(), rotation);
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }

    /// Create a transformation from translation, rotation and per-axis scale,
    /// applied in scale, rotate, translate order
    pub fn from_parts(
        translation: Vector3d,
        rotation: UnitQuaternion<f64>,
        scale: Vector3d,
    ) -> Self {
        Self::from_translation_rotation(translation, rotation) * Self::scaling(scale)
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3d) -> Point3d {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3d::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Apply the transformation to a vector (ignores translation)
    pub fn transform_vector(&self, vector: &Vector3d) -> Vector3d {
        self.matrix.fixed_view::<3, 3>(0, 0) * vector
    }

    /// Compose this transformation with another (`self` applied last)
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Option<Self> {
        self.matrix.try_inverse().map(|inv_matrix| Self {
            matrix: inv_matrix,
        })
    }

    /// Get the inverse transformation, failing on a singular matrix
    pub fn try_inverse(self) -> Result<Self> {
        self.inverse()
            .ok_or_else(|| Error::invalid_data("transform is singular and cannot be inverted"))
    }

    /// Length of each local axis once mapped into the parent space
    pub fn axis_scales(&self) -> Vector3d {
        let linear = self.matrix.fixed_view::<3, 3>(0, 0);
        Vector3d::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        )
    }

    /// Translation component of the transform
    pub fn translation_part(&self) -> Vector3d {
        Vector3d::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// True when the linear part mirrors space (negative determinant)
    pub fn is_mirroring(&self) -> bool {
        self.matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&Self::identity(), epsilon)
    }

    /// Element-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.matrix - other.matrix).amax() <= epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f64>> for Transform3D {
    fn from(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }
}

impl From<Isometry3<f64>> for Transform3D {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_translation_and_inverse() {
        let t = Transform3D::translation(Vector3d::new(1.0, 2.0, 3.0));
        let p = t.transform_point(&Point3d::origin());
        assert_relative_eq!(p, Point3d::new(1.0, 2.0, 3.0));

        let inv = t.try_inverse().unwrap();
        assert!((t * inv).is_identity(1e-12));
    }

    #[test]
    fn test_singular_inverse_fails() {
        let t = Transform3D::scaling(Vector3d::new(1.0, 0.0, 1.0));
        assert!(t.inverse().is_none());
        assert!(matches!(t.try_inverse(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_from_parts_order() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3d::z_axis(), FRAC_PI_2);
        let t = Transform3D::from_parts(
            Vector3d::new(10.0, 0.0, 0.0),
            rotation,
            Vector3d::new(2.0, 1.0, 1.0),
        );
        // x scaled to 2, rotated onto +y, then translated
        let p = t.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3d::new(10.0, 2.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(t.axis_scales(), Vector3d::new(2.0, 1.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(t.translation_part(), Vector3d::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_transform_vector_ignores_translation() {
        let t = Transform3D::translation(Vector3d::new(5.0, 5.0, 5.0));
        let v = t.transform_vector(&Vector3d::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vector3d::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_mirroring() {
        assert!(Transform3D::scaling(Vector3d::new(-1.0, 1.0, 1.0)).is_mirroring());
        assert!(!Transform3D::uniform_scaling(2.0).is_mirroring());
    }
}
