//! Edge collapse simplification
//!
//! Implements iterative edge collapse on a half-edge data structure with
//! quadric error metrics (QEM) for error-driven edge prioritization. Closed
//! shells lose two triangles per collapse. Convexity is restored afterwards
//! by re-hulling the surviving vertices.

use crate::params::ReductionParams;
use crate::restore::{inflate_to_cover, restore_convexity};
use crate::result::ReductionResult;
use crate::MeshSimplifier;
use nalgebra::{Matrix4, Vector4};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use ucxcrate_core::{triangle_normal, Error, Mesh, Point3d, Result, TriangleMesh};

const INVALID: usize = usize::MAX;

/// A closed genus-0 shell cannot go below a tetrahedron
const MIN_VERTICES: usize = 4;

// ============================================================
// Half-Edge Data Structure
// ============================================================

#[derive(Debug, Clone)]
struct HalfEdge {
    target: usize,
    twin: usize,
    next: usize,
    prev: usize,
    face: usize,
}

/// Half-edge mesh for topology-aware edge collapse operations.
struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex (INVALID if removed)
    vertex_edge: Vec<usize>,
    /// One half-edge per face (INVALID if removed)
    face_edge: Vec<usize>,
    active_face_count: usize,
    active_vertex_count: usize,
    positions: Vec<Point3d>,
    quadrics: Vec<Matrix4<f64>>,
    vertex_removed: Vec<bool>,
}

impl HalfEdgeMesh {
    fn from_triangle_mesh(mesh: &TriangleMesh) -> Self {
        let nv = mesh.vertices.len();
        let nf = mesh.faces.len();

        let mut half_edges = Vec::with_capacity(nf * 3);
        let mut vertex_edge = vec![INVALID; nv];
        let mut face_edge = Vec::with_capacity(nf);

        for (fi, face) in mesh.faces.iter().enumerate() {
            let base = fi * 3;
            for j in 0..3usize {
                half_edges.push(HalfEdge {
                    target: face[(j + 1) % 3],
                    twin: INVALID,
                    next: base + (j + 1) % 3,
                    prev: base + (j + 2) % 3,
                    face: fi,
                });
                if vertex_edge[face[j]] == INVALID {
                    vertex_edge[face[j]] = base + j;
                }
            }
            face_edge.push(base);
        }

        // Build twin pointers
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(nf * 3);
        for (he_idx, he) in half_edges.iter().enumerate() {
            let src = half_edges[he.prev].target;
            edge_map.insert((src, he.target), he_idx);
        }
        for he_idx in 0..half_edges.len() {
            if half_edges[he_idx].twin != INVALID {
                continue;
            }
            let src = half_edges[half_edges[he_idx].prev].target;
            let tgt = half_edges[he_idx].target;
            if let Some(&twin_idx) = edge_map.get(&(tgt, src)) {
                half_edges[he_idx].twin = twin_idx;
                half_edges[twin_idx].twin = he_idx;
            }
        }

        let vertex_removed: Vec<bool> = vertex_edge.iter().map(|&e| e == INVALID).collect();
        let active_vertex_count = vertex_removed.iter().filter(|&&r| !r).count();

        let mut hem = HalfEdgeMesh {
            half_edges,
            vertex_edge,
            face_edge,
            active_face_count: nf,
            active_vertex_count,
            positions: mesh.vertices.clone(),
            quadrics: vec![Matrix4::zeros(); nv],
            vertex_removed,
        };
        hem.initialize_quadrics();
        hem
    }

    #[inline]
    fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].target
    }

    /// Corner vertices of the face owning `he`, starting at its source
    fn face_vertices(&self, he: usize) -> [usize; 3] {
        let next = self.half_edges[he].next;
        [self.source(he), self.half_edges[he].target, self.half_edges[next].target]
    }

    fn compute_plane(v0: &Point3d, v1: &Point3d, v2: &Point3d) -> Vector4<f64> {
        let n = triangle_normal(v0, v1, v2).normalize();
        if !n.iter().all(|x| x.is_finite()) {
            return Vector4::new(0.0, 0.0, 1.0, 0.0);
        }
        let d = -n.dot(&v0.coords);
        Vector4::new(n.x, n.y, n.z, d)
    }

    fn plane_to_quadric(p: &Vector4<f64>) -> Matrix4<f64> {
        p * p.transpose()
    }

    fn initialize_quadrics(&mut self) {
        for fi in 0..self.face_edge.len() {
            let he0 = self.face_edge[fi];
            if he0 == INVALID {
                continue;
            }
            let [v0, v1, v2] = self.face_vertices(he0);
            let plane =
                Self::compute_plane(&self.positions[v0], &self.positions[v1], &self.positions[v2]);
            let q = Self::plane_to_quadric(&plane);
            self.quadrics[v0] += q;
            self.quadrics[v1] += q;
            self.quadrics[v2] += q;
        }
    }

    /// Outgoing half-edges of a vertex, counterclockwise
    fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let start = self.vertex_edge[v];
        if start == INVALID {
            return vec![];
        }

        let mut result = Vec::new();
        let mut current = start;
        loop {
            result.push(current);
            let prev = self.half_edges[current].prev;
            let twin = self.half_edges[prev].twin;
            debug_assert_ne!(twin, INVALID, "edge collapse runs on closed shells only");
            if twin == INVALID {
                break;
            }
            current = twin;
            if current == start {
                return result;
            }
        }

        result
    }

    fn neighbors(&self, v: usize) -> HashSet<usize> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].target)
            .collect()
    }

    /// Check the link condition: the endpoints may share no neighbors
    /// besides the two face apices opposite the edge.
    fn check_link_condition(&self, v1: usize, v2: usize) -> bool {
        let n1 = self.neighbors(v1);
        let n2 = self.neighbors(v2);
        n1.intersection(&n2).count() == 2
    }

    fn find_half_edge(&self, from: usize, to: usize) -> Option<usize> {
        self.outgoing_half_edges(from)
            .into_iter()
            .find(|&he| self.half_edges[he].target == to)
    }

    fn vertex_cost(q: &Matrix4<f64>, p: &Point3d) -> f64 {
        let vh = Vector4::new(p.x, p.y, p.z, 1.0);
        (vh.transpose() * q * vh)[0].max(0.0)
    }

    /// QEM optimum for merging `v1` and `v2`. Falls back to the cheapest of
    /// the endpoints and midpoint when the quadric is singular or its optimum
    /// wanders far from the edge.
    fn compute_collapse_cost(&self, v1: usize, v2: usize) -> (Point3d, f64) {
        let q = self.quadrics[v1] + self.quadrics[v2];
        let p1 = self.positions[v1];
        let p2 = self.positions[v2];
        let midpoint = nalgebra::center(&p1, &p2);
        let reach = 2.0 * (p2 - p1).norm();

        let q3 = q.fixed_view::<3, 3>(0, 0).into_owned();
        let q1 = q.fixed_view::<3, 1>(0, 3).into_owned();
        if let Some(inv) = q3.try_inverse() {
            let optimal = Point3d::from(-inv * q1);
            if optimal.iter().all(|x| x.is_finite()) && (optimal - midpoint).norm() <= reach {
                return (optimal, Self::vertex_cost(&q, &optimal));
            }
        }

        [p1, p2, midpoint]
            .into_iter()
            .map(|p| (p, Self::vertex_cost(&q, &p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((midpoint, 0.0))
    }

    /// Whether moving `v1` and `v2` to `new_pos` would flip or flatten any
    /// face that survives the collapse.
    fn collapse_flips_face(&self, v1: usize, v2: usize, new_pos: &Point3d) -> bool {
        let moved = |i: usize| {
            if i == v1 || i == v2 {
                *new_pos
            } else {
                self.positions[i]
            }
        };

        for v in [v1, v2] {
            for he in self.outgoing_half_edges(v) {
                let vertices = self.face_vertices(he);
                if self.half_edges[he].face == INVALID
                    || (vertices.contains(&v1) && vertices.contains(&v2))
                {
                    continue;
                }
                let [a, b, c] = vertices;
                let before = triangle_normal(&self.positions[a], &self.positions[b], &self.positions[c]);
                let after = triangle_normal(&moved(a), &moved(b), &moved(c));
                if after.dot(&before) <= 0.0 || after.norm_squared() <= before.norm_squared() * 1e-12 {
                    return true;
                }
            }
        }
        false
    }

    /// Find any valid outgoing half-edge from a vertex (linear scan fallback).
    fn find_valid_outgoing(&self, v: usize) -> usize {
        for (i, he) in self.half_edges.iter().enumerate() {
            if he.face != INVALID && self.source(i) == v {
                return i;
            }
        }
        INVALID
    }

    /// Collapse edge (v1, v2), merging v2 into v1 at new_pos.
    /// Returns true on success.
    fn collapse_edge(&mut self, v1: usize, v2: usize, new_pos: Point3d) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };

        let h_twin = self.half_edges[h].twin;
        if h_twin == INVALID {
            return false;
        }
        let h_next = self.half_edges[h].next;
        let h_prev = self.half_edges[h].prev;
        let face_a = self.half_edges[h].face;
        let h_next_twin = self.half_edges[h_next].twin;
        let h_prev_twin = self.half_edges[h_prev].twin;
        let c = self.half_edges[h_next].target;

        let ht_next = self.half_edges[h_twin].next;
        let ht_prev = self.half_edges[h_twin].prev;
        let face_b = self.half_edges[h_twin].face;
        let ht_next_twin = self.half_edges[ht_next].twin;
        let ht_prev_twin = self.half_edges[ht_prev].twin;
        let d = self.half_edges[ht_next].target;

        // Collect v2 outgoing edges BEFORE any modifications
        let v2_outgoing = self.outgoing_half_edges(v2);

        // Stitch the outer edges of both removed faces together
        self.half_edges[h_next_twin].twin = h_prev_twin;
        self.half_edges[h_prev_twin].twin = h_next_twin;
        self.half_edges[ht_next_twin].twin = ht_prev_twin;
        self.half_edges[ht_prev_twin].twin = ht_next_twin;

        for he in [h, h_next, h_prev, h_twin, ht_next, ht_prev] {
            self.half_edges[he].face = INVALID;
        }
        self.face_edge[face_a] = INVALID;
        self.face_edge[face_b] = INVALID;
        self.active_face_count -= 2;

        // Redirect all v2 references to v1
        for &he in &v2_outgoing {
            let prev = self.half_edges[he].prev;
            self.half_edges[prev].target = v1;

            let twin = self.half_edges[he].twin;
            if self.half_edges[twin].face != INVALID {
                self.half_edges[twin].target = v1;
            }
        }

        // Fix vertex_edge pointers for v1
        if self.half_edges[self.vertex_edge[v1]].face == INVALID {
            if self.half_edges[h_prev_twin].face != INVALID {
                self.vertex_edge[v1] = h_prev_twin;
            } else {
                self.vertex_edge[v1] = self.find_valid_outgoing(v1);
            }
        }

        // Fix vertex_edge for c
        if self.vertex_edge[c] != INVALID && self.half_edges[self.vertex_edge[c]].face == INVALID {
            if self.half_edges[h_next_twin].face != INVALID {
                self.vertex_edge[c] = h_next_twin;
            } else {
                self.vertex_edge[c] = self.find_valid_outgoing(c);
            }
        }

        // Fix vertex_edge for d
        if d != c
            && self.vertex_edge[d] != INVALID
            && self.half_edges[self.vertex_edge[d]].face == INVALID
        {
            if self.half_edges[ht_next_twin].face != INVALID {
                self.vertex_edge[d] = ht_next_twin;
            } else {
                self.vertex_edge[d] = self.find_valid_outgoing(d);
            }
        }

        // Mark v2 as removed
        self.vertex_edge[v2] = INVALID;
        self.vertex_removed[v2] = true;
        self.active_vertex_count -= 1;

        // Update position and quadric for v1
        let v2_quadric = self.quadrics[v2];
        self.positions[v1] = new_pos;
        self.quadrics[v1] += v2_quadric;

        true
    }

    /// Positions of the vertices still referenced by a face
    fn surviving_positions(&self) -> Vec<Point3d> {
        self.vertex_removed
            .iter()
            .enumerate()
            .filter(|&(i, &removed)| !removed && self.vertex_edge[i] != INVALID)
            .map(|(i, _)| self.positions[i])
            .collect()
    }
}

// ============================================================
// Edge Cost for Priority Queue
// ============================================================

#[derive(Debug, Clone, Copy)]
struct EdgeCost {
    cost: f64,
}

impl PartialEq for EdgeCost {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}
impl Eq for EdgeCost {}

impl PartialOrd for EdgeCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other.cost.total_cmp(&self.cost)
    }
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

// ============================================================
// Edge Collapse Simplifier
// ============================================================

/// Edge collapse simplifier for closed shells using a half-edge structure and QEM.
///
/// Collapses run until the triangle count reaches the target, the shell is
/// down to a tetrahedron, or no legal collapse remains. The surviving
/// vertices are then re-hulled so the output is convex and closed, and, when
/// `conservative` is set, inflated about its centroid until it covers every
/// input vertex.
#[derive(Debug, Clone)]
pub struct EdgeCollapseSimplifier {
    /// Inflate the reduced hull to cover the input vertices
    pub conservative: bool,
    /// Reject collapses that flip or flatten a surviving face
    pub flip_guard: bool,
}

impl Default for EdgeCollapseSimplifier {
    fn default() -> Self {
        Self {
            conservative: true,
            flip_guard: true,
        }
    }
}

impl EdgeCollapseSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(conservative: bool, flip_guard: bool) -> Self {
        Self {
            conservative,
            flip_guard,
        }
    }

    pub fn from_params(params: &ReductionParams) -> Self {
        Self {
            conservative: params.conservative,
            flip_guard: params.flip_guard,
        }
    }

    /// Build the initial priority queue of edge collapse candidates.
    fn build_queue(&self, hem: &HalfEdgeMesh) -> PriorityQueue<(usize, usize), EdgeCost> {
        let mut queue = PriorityQueue::new();

        for vi in 0..hem.positions.len() {
            if hem.vertex_removed[vi] {
                continue;
            }
            for &he in &hem.outgoing_half_edges(vi) {
                let target = hem.half_edges[he].target;
                let key = edge_key(vi, target);
                if queue.get(&key).is_some() {
                    continue;
                }
                let (_, cost) = hem.compute_collapse_cost(vi, target);
                queue.push(key, EdgeCost { cost });
            }
        }

        queue
    }

    /// Re-price every edge around `v` after it absorbed a neighbor.
    fn requeue_around(
        &self,
        hem: &HalfEdgeMesh,
        queue: &mut PriorityQueue<(usize, usize), EdgeCost>,
        v: usize,
    ) {
        for n in hem.neighbors(v) {
            let (_, cost) = hem.compute_collapse_cost(v, n);
            queue.push(edge_key(v, n), EdgeCost { cost });
        }
    }
}

impl MeshSimplifier for EdgeCollapseSimplifier {
    fn simplify(&self, mesh: &Mesh, target: usize) -> Result<ReductionResult> {
        if target == 0 {
            return Err(Error::invalid_config("triangle target must be at least 1"));
        }
        mesh.validate()?;

        let original_triangles = mesh.triangle_count();
        if original_triangles <= target {
            return Ok(ReductionResult::unchanged(mesh.clone(), target));
        }
        if !mesh.is_closed() {
            return Err(Error::invalid_data("triangle reduction requires a closed mesh"));
        }

        info!(
            original_triangles,
            target_triangles = target,
            conservative = self.conservative,
            "reducing triangle count"
        );

        let triangles = mesh.compacted().triangulate();
        let mut hem = HalfEdgeMesh::from_triangle_mesh(&triangles);
        let mut queue = self.build_queue(&hem);
        let mut collapses_performed = 0usize;
        let mut collapses_rejected = 0usize;

        while hem.active_face_count > target && hem.active_vertex_count > MIN_VERTICES {
            let Some(((v1, v2), _)) = queue.pop() else {
                break;
            };

            // Stale entry: an endpoint was merged away
            if hem.vertex_removed[v1]
                || hem.vertex_removed[v2]
                || hem.vertex_edge[v1] == INVALID
                || hem.vertex_edge[v2] == INVALID
                || hem.find_half_edge(v1, v2).is_none()
            {
                continue;
            }

            if !hem.check_link_condition(v1, v2) {
                collapses_rejected += 1;
                continue;
            }

            let (pos, _) = hem.compute_collapse_cost(v1, v2);
            if self.flip_guard && hem.collapse_flips_face(v1, v2, &pos) {
                collapses_rejected += 1;
                continue;
            }

            if hem.collapse_edge(v1, v2, pos) {
                collapses_performed += 1;
                self.requeue_around(&hem, &mut queue, v1);
            }
        }

        debug!(
            collapses_performed,
            collapses_rejected,
            remaining_faces = hem.active_face_count,
            remaining_vertices = hem.active_vertex_count,
            "edge collapse finished"
        );

        let survivors = hem.surviving_positions();
        let reduced = match restore_convexity(&survivors) {
            Ok(reduced) => reduced,
            Err(err) => {
                warn!(error = %err, "reduced shell could not be re-hulled, keeping input");
                return Ok(ReductionResult::unchanged(mesh.clone(), target));
            }
        };

        let reduced = if self.conservative {
            let (inflated, scale) = inflate_to_cover(&reduced, &mesh.vertices);
            debug!(scale, "reduced shell inflated to cover input");
            inflated
        } else {
            reduced
        };

        let result = ReductionResult {
            original_triangles,
            target_triangles: target,
            final_triangles: reduced.triangle_count(),
            collapses_performed,
            collapses_rejected,
            mesh: reduced,
        };

        if result.reached_target() {
            info!(
                final_triangles = result.final_triangles,
                collapses = collapses_performed,
                "triangle reduction complete"
            );
        } else {
            warn!(
                final_triangles = result.final_triangles,
                target_triangles = target,
                "triangle reduction stopped above target"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use ucxcrate_hull::{build_convex_hull, contains_point, is_convex};

    fn make_tetrahedron() -> TriangleMesh {
        // Consistently wound: each shared edge appears in opposite directions
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(0.5, 1.0, 0.0),
                Point3d::new(0.5, 0.5, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    /// Evenly spread points on a sphere, all of them hull vertices
    fn fibonacci_sphere(count: usize, radius: f64) -> Vec<Point3d> {
        let golden = PI * (3.0 - 5.0f64.sqrt());
        (0..count)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
                let r = (1.0 - y * y).sqrt();
                let theta = golden * i as f64;
                Point3d::new(r * theta.cos(), y, r * theta.sin()) * radius
            })
            .collect()
    }

    fn sphere_hull(count: usize) -> Mesh {
        build_convex_hull(&fibonacci_sphere(count, 1.0)).unwrap().mesh
    }

    fn cube() -> Mesh {
        let points: Vec<Point3d> = (0..8)
            .map(|i| {
                Point3d::new(
                    (i & 1) as f64 * 2.0 - 1.0,
                    ((i >> 1) & 1) as f64 * 2.0 - 1.0,
                    ((i >> 2) & 1) as f64 * 2.0 - 1.0,
                )
            })
            .collect();
        build_convex_hull(&points).unwrap().mesh
    }

    // ---- Half-edge structure tests ----

    #[test]
    fn test_halfedge_construction() {
        let mesh = make_tetrahedron();
        let hem = HalfEdgeMesh::from_triangle_mesh(&mesh);
        assert_eq!(hem.half_edges.len(), 12); // 4 faces * 3
        assert_eq!(hem.active_face_count, 4);
        assert_eq!(hem.active_vertex_count, 4);

        // Every half-edge of a closed shell has a twin
        for he in &hem.half_edges {
            assert_ne!(he.twin, INVALID, "closed shell half-edge should have twin");
        }
    }

    #[test]
    fn test_halfedge_neighbors() {
        let hem = HalfEdgeMesh::from_triangle_mesh(&make_tetrahedron());
        for v in 0..4 {
            assert_eq!(hem.neighbors(v).len(), 3, "tetrahedron vertex should have 3 neighbors");
        }
    }

    #[test]
    fn test_link_condition_tetrahedron() {
        let hem = HalfEdgeMesh::from_triangle_mesh(&make_tetrahedron());
        assert!(hem.check_link_condition(0, 1));
        assert!(hem.check_link_condition(1, 2));
    }

    #[test]
    fn test_collapse_keeps_shell_closed() {
        let triangles = sphere_hull(30).triangulate();
        let mut hem = HalfEdgeMesh::from_triangle_mesh(&triangles);
        let v2 = hem.half_edges[hem.vertex_edge[0]].target;
        assert!(hem.check_link_condition(0, v2));
        let (pos, cost) = hem.compute_collapse_cost(0, v2);
        assert!(cost >= 0.0);

        assert!(hem.collapse_edge(0, v2, pos));
        assert_eq!(hem.active_face_count, triangles.faces.len() - 2);
        assert_eq!(hem.active_vertex_count, 29);
        for fi in 0..hem.face_edge.len() {
            let he = hem.face_edge[fi];
            if he == INVALID {
                continue;
            }
            for e in [he, hem.half_edges[he].next, hem.half_edges[he].prev] {
                let twin = hem.half_edges[e].twin;
                assert_ne!(twin, INVALID);
                assert_eq!(hem.half_edges[twin].twin, e);
                assert_eq!(hem.source(twin), hem.half_edges[e].target);
            }
        }
    }

    #[test]
    fn test_flip_guard_rejects_inversion() {
        let hem = HalfEdgeMesh::from_triangle_mesh(&cube().triangulate());
        let v2 = hem.half_edges[hem.vertex_edge[0]].target;
        // Dragging both endpoints through the opposite side turns faces over
        let through = Point3d::from(-hem.positions[0].coords * 3.0);
        assert!(hem.collapse_flips_face(0, v2, &through));
        let midpoint = nalgebra::center(&hem.positions[0], &hem.positions[v2]);
        assert!(!hem.collapse_flips_face(0, v2, &midpoint));
    }

    // ---- Simplification tests ----

    #[test]
    fn test_zero_target_rejected() {
        let s = EdgeCollapseSimplifier::new();
        assert!(matches!(
            s.simplify(&cube(), 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_target_above_count_is_unchanged() {
        let s = EdgeCollapseSimplifier::new();
        let mesh = cube();
        let result = s.simplify(&mesh, 12).unwrap();
        assert_eq!(result.mesh, mesh);
        assert_eq!(result.collapses_performed, 0);
        assert!(result.reached_target());

        let result = s.simplify(&mesh, 100).unwrap();
        assert_eq!(result.mesh, mesh);
    }

    #[test]
    fn test_open_mesh_rejected() {
        let s = EdgeCollapseSimplifier::new();
        let mut mesh = sphere_hull(20);
        mesh.faces.pop();
        assert!(matches!(s.simplify(&mesh, 8), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_sphere_reduced_to_budget() {
        let s = EdgeCollapseSimplifier::new();
        let mesh = sphere_hull(100);
        assert_eq!(mesh.triangle_count(), 196);

        let result = s.simplify(&mesh, 32).unwrap();
        assert!(result.reached_target(), "{}", result);
        assert!(result.final_triangles <= 32);
        assert!(result.final_triangles >= 4);
        assert_eq!(result.final_triangles, result.mesh.triangle_count());
        assert!(result.collapses_performed > 0);
        assert!(result.mesh.is_closed());
        assert!(is_convex(&result.mesh, 1e-9));
    }

    #[test]
    fn test_conservative_result_covers_input() {
        let s = EdgeCollapseSimplifier::new();
        let mesh = sphere_hull(80);
        let result = s.simplify(&mesh, 20).unwrap();
        for v in &mesh.vertices {
            assert!(contains_point(&result.mesh, v, 1e-9));
        }
        assert!(result.mesh.volume() >= mesh.volume() * 0.999);
    }

    #[test]
    fn test_non_conservative_result_is_convex() {
        let s = EdgeCollapseSimplifier::with_params(false, true);
        let mesh = sphere_hull(60);
        let result = s.simplify(&mesh, 24).unwrap();
        assert!(result.final_triangles <= 24);
        assert!(result.mesh.is_closed());
        assert!(is_convex(&result.mesh, 1e-9));
        // No inflation: the reduced hull fits inside a slightly grown sphere
        for v in &result.mesh.vertices {
            assert!(v.coords.norm() < 1.5);
        }
    }

    #[test]
    fn test_never_increases_triangle_count() {
        let s = EdgeCollapseSimplifier::new();
        let mesh = sphere_hull(40);
        for target in [1, 5, 17, 40, 75] {
            let result = s.simplify(&mesh, target).unwrap();
            assert!(result.final_triangles <= mesh.triangle_count());
            assert!(result.mesh.is_closed());
        }
    }

    #[test]
    fn test_tetrahedron_floor() {
        let s = EdgeCollapseSimplifier::new();
        let result = s.simplify(&cube(), 1).unwrap();
        assert!(result.final_triangles >= 4);
        assert!(result.final_triangles < 12);
        assert!(result.mesh.vertex_count() >= 4);
        assert!(!result.reached_target());
        assert!(result.mesh.is_closed());
    }

    #[test]
    fn test_polygon_faces_are_triangulated() {
        let hull = cube();
        let quads: Vec<Vec<usize>> = vec![
            vec![0, 2, 3, 1],
            vec![4, 5, 7, 6],
            vec![0, 1, 5, 4],
            vec![2, 6, 7, 3],
            vec![0, 4, 6, 2],
            vec![1, 3, 7, 5],
        ];
        let corners: Vec<Point3d> = (0..8)
            .map(|i| {
                Point3d::new(
                    (i & 1) as f64 * 2.0 - 1.0,
                    ((i >> 1) & 1) as f64 * 2.0 - 1.0,
                    ((i >> 2) & 1) as f64 * 2.0 - 1.0,
                )
            })
            .collect();
        let mesh = Mesh::from_vertices_and_faces(corners, quads);
        assert_eq!(mesh.triangle_count(), hull.triangle_count());
        let result = EdgeCollapseSimplifier::new().simplify(&mesh, 10).unwrap();
        assert!(result.final_triangles <= 10);
        for v in &mesh.vertices {
            assert!(contains_point(&result.mesh, v, 1e-9));
        }
    }
}
