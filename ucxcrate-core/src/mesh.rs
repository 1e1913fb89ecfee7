//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A polygon mesh: vertex positions plus faces given as ordered index loops.
///
/// Faces are wound counter-clockwise when seen from outside, so the right-hand
/// rule yields an outward normal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<Vec<usize>>,
}

/// A triangle-only mesh, the form every geometry stage emits
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and polygon faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from vertices and triangles
    pub fn from_triangles(vertices: Vec<Point3d>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces: triangles.into_iter().map(|t| t.to_vec()).collect(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles the faces decompose into
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3d) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: Vec<usize>) {
        self.faces.push(face);
    }

    /// Check structural invariants: finite coordinates, indices in range,
    /// and at least three distinct vertices per face.
    pub fn validate(&self) -> Result<()> {
        if let Some(i) = self.vertices.iter().position(|v| !is_finite_point(v)) {
            return Err(Error::invalid_data(format!(
                "vertex {} has non-finite coordinates",
                i
            )));
        }
        for (fi, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(Error::invalid_data(format!(
                    "face {} has {} vertices, at least 3 required",
                    fi,
                    face.len()
                )));
            }
            if let Some(&bad) = face.iter().find(|&&i| i >= self.vertices.len()) {
                return Err(Error::invalid_data(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    fi,
                    bad,
                    self.vertices.len()
                )));
            }
            let mut distinct = face.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() < 3 {
                return Err(Error::invalid_data(format!(
                    "face {} has fewer than 3 distinct vertices",
                    fi
                )));
            }
        }
        Ok(())
    }

    /// Check whether every face is a triangle
    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(|f| f.len() == 3)
    }

    /// Fan-triangulate every face. Exact for the planar convex faces that
    /// the hull and box builders emit.
    pub fn triangulate(&self) -> TriangleMesh {
        let mut faces = Vec::with_capacity(self.triangle_count());
        for face in &self.faces {
            for i in 1..face.len().saturating_sub(1) {
                faces.push([face[0], face[i], face[i + 1]]);
            }
        }
        TriangleMesh {
            vertices: self.vertices.clone(),
            faces,
        }
    }

    /// Count directed edge uses keyed by the undirected edge.
    ///
    /// The value is `(forward, backward)` where forward means `a -> b` with `a < b`.
    pub fn edge_face_counts(&self) -> HashMap<(usize, usize), (usize, usize)> {
        let mut counts: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        for face in &self.faces {
            for i in 0..face.len() {
                let a = face[i];
                let b = face[(i + 1) % face.len()];
                if a < b {
                    counts.entry((a, b)).or_default().0 += 1;
                } else {
                    counts.entry((b, a)).or_default().1 += 1;
                }
            }
        }
        counts
    }

    /// Watertight check: every edge is shared by exactly two faces that
    /// traverse it in opposite directions.
    pub fn is_closed(&self) -> bool {
        !self.faces.is_empty()
            && self
                .edge_face_counts()
                .values()
                .all(|&(forward, backward)| forward == 1 && backward == 1)
    }

    /// Signed enclosed volume (positive for outward winding on a closed mesh)
    pub fn volume(&self) -> f64 {
        let mut volume = 0.0;
        for face in &self.faces {
            let a = self.vertices[face[0]].coords;
            for i in 1..face.len().saturating_sub(1) {
                let b = self.vertices[face[i]].coords;
                let c = self.vertices[face[i + 1]].coords;
                volume += a.dot(&b.cross(&c));
            }
        }
        volume / 6.0
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.face_normals().iter().map(|n| n.norm()).sum::<f64>() * 0.5
    }

    /// Unnormalized face normals; the length is twice the face area
    pub fn face_normals(&self) -> Vec<Vector3d> {
        self.faces
            .iter()
            .map(|face| {
                let a = &self.vertices[face[0]];
                let mut normal = Vector3d::zeros();
                for i in 1..face.len().saturating_sub(1) {
                    normal += triangle_normal(a, &self.vertices[face[i]], &self.vertices[face[i + 1]]);
                }
                normal
            })
            .collect()
    }

    /// Mean of the vertex positions (median-style origin)
    pub fn centroid(&self) -> Point3d {
        mean_point(&self.vertices).unwrap_or_else(Point3d::origin)
    }

    /// Volume-weighted center of mass of a closed mesh. Falls back to the
    /// vertex centroid when the enclosed volume vanishes.
    pub fn center_of_mass(&self) -> Point3d {
        let mut weighted = Vector3d::zeros();
        let mut volume = 0.0;
        for face in &self.faces {
            let a = self.vertices[face[0]].coords;
            for i in 1..face.len().saturating_sub(1) {
                let b = self.vertices[face[i]].coords;
                let c = self.vertices[face[i + 1]].coords;
                let v = a.dot(&b.cross(&c));
                volume += v;
                weighted += (a + b + c) * v;
            }
        }
        if volume.abs() <= f64::EPSILON {
            return self.centroid();
        }
        Point3d::from(weighted / (4.0 * volume))
    }

    /// Copy of the mesh with every vertex shifted by `offset`
    pub fn translated(&self, offset: &Vector3d) -> Mesh {
        Mesh {
            vertices: self.vertices.iter().map(|v| v + offset).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Copy of the mesh mapped through a transform. Winding is reversed for
    /// mirroring transforms so normals stay outward.
    pub fn transformed(&self, transform: &Transform3D) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| transform.transform_point(v))
            .collect();
        let faces = if transform.is_mirroring() {
            self.faces
                .iter()
                .map(|f| f.iter().rev().copied().collect())
                .collect()
        } else {
            self.faces.clone()
        };
        Mesh { vertices, faces }
    }

    /// Drop vertices no face references, remapping face indices
    pub fn compacted(&self) -> Mesh {
        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut vertices = Vec::new();
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            let mut new_face = Vec::with_capacity(face.len());
            for &i in face {
                if remap[i] == usize::MAX {
                    remap[i] = vertices.len();
                    vertices.push(self.vertices[i]);
                }
                new_face.push(remap[i]);
            }
            faces.push(new_face);
        }
        Mesh { vertices, faces }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
    }
}

impl TriangleMesh {
    /// Create a triangle mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Convert into the general polygon representation
    pub fn into_mesh(self) -> Mesh {
        Mesh::from_triangles(self.vertices, self.faces)
    }
}

impl From<TriangleMesh> for Mesh {
    fn from(mesh: TriangleMesh) -> Self {
        mesh.into_mesh()
    }
}
