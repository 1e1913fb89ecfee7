//! Source objects handed over by the host

use serde::{Deserialize, Serialize};
use ucxcrate_core::{Error, Mesh, Point3d, Result, Transform3D};

/// A named mesh with its local-to-world transform, as read from the host.
///
/// Every vertex position takes part in proxy generation, including vertices
/// no face references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceObject {
    pub name: String,
    pub mesh: Mesh,
    pub transform: Transform3D,
}

impl SourceObject {
    /// Create a source object, validating its name, mesh and transform.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] for an empty name, a malformed mesh or a
    /// transform with non-finite entries.
    pub fn new(name: impl Into<String>, mesh: Mesh, transform: Transform3D) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_data("source object name must not be empty"));
        }
        mesh.validate()?;
        if !transform.matrix.iter().all(|x| x.is_finite()) {
            return Err(Error::invalid_data(format!(
                "transform of '{}' has non-finite entries",
                name
            )));
        }
        Ok(Self {
            name,
            mesh,
            transform,
        })
    }

    /// Source placed at the world origin
    pub fn at_origin(name: impl Into<String>, mesh: Mesh) -> Result<Self> {
        Self::new(name, mesh, Transform3D::identity())
    }

    /// Vertex positions in the object's own space
    pub fn local_points(&self) -> &[Point3d] {
        &self.mesh.vertices
    }

    /// Vertex positions mapped into world space
    pub fn world_points(&self) -> Vec<Point3d> {
        self.mesh
            .vertices
            .iter()
            .map(|p| self.transform.transform_point(p))
            .collect()
    }

    pub fn world_mesh(&self) -> Mesh {
        self.mesh.transformed(&self.transform)
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ucxcrate_core::Vector3d;

    fn triangle() -> Mesh {
        Mesh::from_triangles(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_world_points_follow_transform() {
        let transform = Transform3D::translation(Vector3d::new(0.0, 0.0, 2.0))
            * Transform3D::uniform_scaling(3.0);
        let source = SourceObject::new("Plate", triangle(), transform).unwrap();
        let world = source.world_points();
        assert_eq!(world.len(), 3);
        assert_relative_eq!(world[1], Point3d::new(3.0, 0.0, 2.0));
        assert_eq!(source.local_points()[1], Point3d::new(1.0, 0.0, 0.0));
        assert_eq!(source.world_mesh().vertices, world);
    }

    #[test]
    fn test_unreferenced_vertices_are_kept() {
        let mut mesh = triangle();
        mesh.add_vertex(Point3d::new(5.0, 5.0, 5.0));
        let source = SourceObject::at_origin("Loose", mesh).unwrap();
        assert_eq!(source.world_points().len(), 4);
    }

    #[test]
    fn test_rejects_invalid_sources() {
        assert!(matches!(
            SourceObject::at_origin("", triangle()),
            Err(Error::InvalidData(_))
        ));

        let broken = Mesh::from_vertices_and_faces(vec![Point3d::origin()], vec![vec![0, 1, 2]]);
        assert!(matches!(
            SourceObject::at_origin("Broken", broken),
            Err(Error::InvalidData(_))
        ));

        let mut transform = Transform3D::identity();
        transform.matrix[(0, 3)] = f64::NAN;
        assert!(matches!(
            SourceObject::new("Nan", triangle(), transform),
            Err(Error::InvalidData(_))
        ));
    }
}
