//! Core traits for ucxcrate

use crate::{mesh::*, point::*, transform::Transform3D};

/// Trait for geometry with an axis-aligned extent
pub trait Bounded {
    /// Get the axis-aligned bounding box as `(min, max)`
    fn bounding_box(&self) -> (Point3d, Point3d);

    /// Get the center point of the bounding box
    fn center(&self) -> Point3d {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }

    /// Length of the bounding box diagonal
    fn diagonal(&self) -> f64 {
        let (min, max) = self.bounding_box();
        (max - min).norm()
    }
}

/// Trait for objects that can be transformed
pub trait Transformable {
    /// Apply a transformation to the object
    fn transform(&mut self, transform: &Transform3D);
}

impl Bounded for [Point3d] {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        let Some(first) = self.first() else {
            return (Point3d::origin(), Point3d::origin());
        };

        let mut min = *first;
        let mut max = *first;

        for p in self {
            min = min.inf(p);
            max = max.sup(p);
        }

        (min, max)
    }
}

impl Bounded for Vec<Point3d> {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        self.as_slice().bounding_box()
    }
}

impl Bounded for Mesh {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        self.vertices.bounding_box()
    }
}

impl Bounded for TriangleMesh {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        self.vertices.bounding_box()
    }
}

impl Transformable for Mesh {
    fn transform(&mut self, transform: &Transform3D) {
        *self = self.transformed(transform);
    }
}

impl Transformable for Vec<Point3d> {
    fn transform(&mut self, transform: &Transform3D) {
        for p in self.iter_mut() {
            *p = transform.transform_point(p);
        }
    }
}
