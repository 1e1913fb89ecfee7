//! Coplanar facet merging
//!
//! Quickhull emits triangles; a flat hull facet typically comes out as a fan
//! of nearly coplanar triangles, some of them slivers. This pass groups
//! triangles into facets, keeps only true corners (vertices touching three
//! or more facets), and hands back each facet as a corner polygon.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use ucxcrate_core::{triangle_normal, Point3d, Vector3d};

/// Group near-coplanar triangles of a closed, consistently wound shell
/// into facet polygons over corner vertices.
///
/// Returns `None` when a facet is not a simple disk or collapses to fewer
/// than three corners; callers keep the raw triangulation in that case.
pub fn merge_coplanar_facets(
    triangles: &[[usize; 3]],
    points: &[Point3d],
    tolerance: f64,
) -> Option<Vec<Vec<usize>>> {
    let facet_of = group_facets(triangles, points, tolerance);
    let facet_count = facet_of.iter().copied().max().map_or(0, |m| m + 1);

    // Distinct facets around each vertex
    let mut vertex_facets: HashMap<usize, HashSet<usize>> = HashMap::new();
    for (ti, tri) in triangles.iter().enumerate() {
        for &v in tri {
            vertex_facets.entry(v).or_default().insert(facet_of[ti]);
        }
    }
    let is_corner = |v: usize| vertex_facets.get(&v).map_or(false, |f| f.len() >= 3);

    let edge_owner = edge_owners(triangles);

    let mut polygons = Vec::with_capacity(facet_count);
    for facet in 0..facet_count {
        // Boundary edges: directed edges whose twin lies in another facet
        let mut next: HashMap<usize, usize> = HashMap::new();
        for (ti, tri) in triangles.iter().enumerate() {
            if facet_of[ti] != facet {
                continue;
            }
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let twin_facet = edge_owner.get(&(b, a)).map(|&t| facet_of[t]);
                if twin_facet != Some(facet) && next.insert(a, b).is_some() {
                    // Pinched boundary
                    return None;
                }
            }
        }

        let &start = next.keys().min()?;
        let mut loop_vertices = vec![start];
        let mut current = next[&start];
        while current != start {
            if loop_vertices.len() > next.len() {
                return None;
            }
            loop_vertices.push(current);
            current = *next.get(&current)?;
        }
        if loop_vertices.len() != next.len() {
            // Facet with a hole
            return None;
        }

        let corners: Vec<usize> = loop_vertices.into_iter().filter(|&v| is_corner(v)).collect();
        if corners.len() < 3 {
            return None;
        }
        polygons.push(corners);
    }

    Some(polygons)
}

/// Directed edge -> owning triangle
fn edge_owners(triangles: &[[usize; 3]]) -> HashMap<(usize, usize), usize> {
    let mut owners = HashMap::with_capacity(triangles.len() * 3);
    for (ti, tri) in triangles.iter().enumerate() {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            owners.insert((a, b), ti);
        }
    }
    owners
}

/// Region-grow facets, seeding from the largest triangles so a sliver never
/// defines a facet plane.
fn group_facets(triangles: &[[usize; 3]], points: &[Point3d], tolerance: f64) -> Vec<usize> {
    const UNASSIGNED: usize = usize::MAX;

    let normals: Vec<Vector3d> = triangles
        .iter()
        .map(|t| triangle_normal(&points[t[0]], &points[t[1]], &points[t[2]]))
        .collect();
    let owners = edge_owners(triangles);

    let mut facet_of = vec![UNASSIGNED; triangles.len()];
    let mut facet = 0;

    let seeds = (0..triangles.len())
        .sorted_by(|&a, &b| normals[b].norm_squared().total_cmp(&normals[a].norm_squared()));

    for seed in seeds {
        if facet_of[seed] != UNASSIGNED {
            continue;
        }
        let length = normals[seed].norm();
        let normal = if length > f64::MIN_POSITIVE {
            normals[seed] / length
        } else {
            Vector3d::zeros()
        };
        let offset = normal.dot(&points[triangles[seed][0]].coords);
        let on_plane = |v: usize| (normal.dot(&points[v].coords) - offset).abs() <= tolerance;

        facet_of[seed] = facet;
        let mut stack = vec![seed];
        while let Some(ti) = stack.pop() {
            let tri = triangles[ti];
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let Some(&nb) = owners.get(&(b, a)) else {
                    continue;
                };
                if facet_of[nb] != UNASSIGNED || normals[nb].dot(&normal) < 0.0 {
                    continue;
                }
                if triangles[nb].iter().all(|&v| on_plane(v)) {
                    facet_of[nb] = facet;
                    stack.push(nb);
                }
            }
        }
        facet += 1;
    }

    facet_of
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A square split into two triangles on top of a pyramid-like base
    fn square_pyramid() -> (Vec<Point3d>, Vec<[usize; 3]>) {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(0.5, 0.5, 1.0),
        ];
        let triangles = vec![
            // base, facing -z
            [0, 2, 1],
            [0, 3, 2],
            // sides
            [0, 1, 4],
            [1, 2, 4],
            [2, 3, 4],
            [3, 0, 4],
        ];
        (points, triangles)
    }

    #[test]
    fn test_square_base_becomes_quad() {
        let (points, triangles) = square_pyramid();
        let polygons = merge_coplanar_facets(&triangles, &points, 1e-9).unwrap();
        assert_eq!(polygons.len(), 5);
        let quads: Vec<_> = polygons.iter().filter(|p| p.len() == 4).collect();
        assert_eq!(quads.len(), 1);
        let mut base = quads[0].clone();
        base.sort_unstable();
        assert_eq!(base, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_edge_midpoint_vertex_dropped() {
        // Base edge 0-1 split by vertex 5 lying on it
        let mut points = square_pyramid().0;
        points.push(Point3d::new(0.5, 0.0, 0.0));
        let triangles = vec![
            [0, 2, 5],
            [5, 2, 1],
            [0, 3, 2],
            [0, 5, 4],
            [5, 1, 4],
            [1, 2, 4],
            [2, 3, 4],
            [3, 0, 4],
        ];
        let polygons = merge_coplanar_facets(&triangles, &points, 1e-9).unwrap();
        assert_eq!(polygons.len(), 5);
        assert!(polygons.iter().all(|p| !p.contains(&5)));
    }

    #[test]
    fn test_distinct_planes_kept_apart() {
        let (points, triangles) = square_pyramid();
        let facets = group_facets(&triangles, &points, 1e-9);
        assert_eq!(facets[0], facets[1]);
        let distinct: HashSet<_> = facets.iter().collect();
        assert_eq!(distinct.len(), 5);
    }
}
