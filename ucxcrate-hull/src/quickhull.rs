//! # QuickHull
//!
//! 3D convex hull computation using the QuickHull algorithm
//! (Barber, Dobkin and Huhdanpaa).
//!
//! ## Algorithm Steps
//!
//! 1. Pick the tolerance ε from the bounding box diagonal of the input
//! 2. Build an initial tetrahedron from extreme points
//! 3. Assign every remaining point to one face it lies outside of
//! 4. While some face has outside points:
//!    a. Take that face's farthest point (the eye)
//!    b. Flood fill the faces the eye sees, coplanar ones included, and
//!       grow the region until its horizon is one simple loop
//!    c. Stitch a cone of new faces from the horizon to the eye
//!    d. Reassign the orphaned outside points to the new faces
//! 5. Merge near-coplanar triangles into facets and re-triangulate them
//! 6. Check the shell; on failure rebuild with a wider tolerance
//!
//! ε only decides which points are worth adding. Visibility uses the sign
//! of the distance with a band a thousand times narrower than ε, so a
//! face is never kept when the eye sits in front of it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ucxcrate_core::{is_finite_point, Bounded, Error, Mesh, Point3d, Result, Vector3d};

use crate::facets::merge_coplanar_facets;
use crate::validation::{face_planes, is_convex, max_outside_distance};

/// Parameters for convex hull construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullParams {
    /// Tolerance relative to the input bounding box diagonal. Points closer
    /// than `tolerance_factor * diagonal` to a face count as lying on it.
    pub tolerance_factor: f64,
    /// Merge near-coplanar triangles into single facets before triangulating
    pub merge_coplanar: bool,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            tolerance_factor: 1e-5,
            merge_coplanar: true,
        }
    }
}

impl HullParams {
    /// Params with a custom relative tolerance
    pub fn with_tolerance(tolerance_factor: f64) -> Self {
        Self {
            tolerance_factor,
            ..Default::default()
        }
    }
}

/// A convex hull plus the classification of every input point
#[derive(Debug, Clone)]
pub struct HullResult {
    /// Closed, outward-wound triangle shell
    pub mesh: Mesh,
    /// For each hull vertex, the index of the input point it came from
    pub vertex_sources: Vec<usize>,
    /// Input indices that were discarded (interior, duplicate or within ε of a facet)
    pub interior: Vec<usize>,
    /// Number of input points that became hull vertices
    pub boundary_count: usize,
    /// Number of input points that were discarded
    pub interior_count: usize,
    /// Absolute tolerance used for this hull
    pub tolerance: f64,
}

impl HullResult {
    /// Whether the input point at `index` became a hull vertex
    pub fn is_boundary(&self, index: usize) -> bool {
        self.vertex_sources.contains(&index)
    }

    /// Number of triangles in the hull
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Computes the convex hull of a set of 3D points with default parameters.
///
/// # Errors
///
/// * [`Error::InsufficientInput`] for fewer than 4 points
/// * [`Error::DegenerateInput`] when the points are coincident, collinear
///   or coplanar (a flat hull has no volume)
/// * [`Error::InvalidData`] for non-finite coordinates
///
/// # Example
///
/// ```rust
/// use ucxcrate_core::Point3d;
/// use ucxcrate_hull::build_convex_hull;
///
/// let points = vec![
///     Point3d::new(0.0, 0.0, 0.0),
///     Point3d::new(1.0, 0.0, 0.0),
///     Point3d::new(0.0, 1.0, 0.0),
///     Point3d::new(0.0, 0.0, 1.0),
///     Point3d::new(0.1, 0.1, 0.1),
/// ];
/// let hull = build_convex_hull(&points).unwrap();
/// assert_eq!(hull.triangle_count(), 4);
/// assert_eq!(hull.interior_count, 1);
/// ```
pub fn build_convex_hull(points: &[Point3d]) -> Result<HullResult> {
    build_convex_hull_with(points, &HullParams::default())
}

/// Computes the convex hull of every vertex position of a mesh
pub fn convex_hull_of_mesh(mesh: &Mesh) -> Result<HullResult> {
    build_convex_hull(&mesh.vertices)
}

/// Computes the convex hull of a set of 3D points.
///
/// Every hull is checked before it is returned: closed, outward facing,
/// convex and covering the discarded input to within a few ε. A hull that
/// fails the check is rebuilt with a tenfold wider tolerance, up to
/// [`TOLERANCE_RETRIES`] times.
pub fn build_convex_hull_with(points: &[Point3d], params: &HullParams) -> Result<HullResult> {
    if points.len() < 4 {
        return Err(Error::InsufficientInput {
            required: 4,
            found: points.len(),
        });
    }
    if !params.tolerance_factor.is_finite() || params.tolerance_factor < 0.0 {
        return Err(Error::invalid_config(format!(
            "hull tolerance factor must be finite and non-negative, got {}",
            params.tolerance_factor
        )));
    }
    if let Some(i) = points.iter().position(|p| !is_finite_point(p)) {
        return Err(Error::invalid_data(format!(
            "point {} has non-finite coordinates",
            i
        )));
    }

    let diagonal = points.diagonal();
    if diagonal <= f64::MIN_POSITIVE {
        return Err(Error::degenerate("all points coincide"));
    }

    let mut factor = params.tolerance_factor;
    let mut failure = None;
    for attempt in 0..=TOLERANCE_RETRIES {
        let tolerance = (factor * diagonal).max(diagonal * 1e-12);
        match build_attempt(points, tolerance, params.merge_coplanar) {
            Ok(result) => {
                debug!(
                    points = points.len(),
                    tolerance,
                    attempt,
                    hull_vertices = result.boundary_count,
                    discarded = result.interior_count,
                    triangles = result.mesh.face_count(),
                    "convex hull built"
                );
                return Ok(result);
            }
            Err(err @ Error::DegenerateInput(_)) if attempt == 0 => return Err(err),
            // A wider band flattened the input; report the earlier failure
            Err(Error::DegenerateInput(_)) => break,
            Err(err) => {
                debug!(attempt, tolerance, error = %err, "hull rejected, widening tolerance");
                failure = Some(err);
            }
        }
        factor = factor.max(1e-9) * 10.0;
    }

    Err(failure.unwrap_or_else(|| Error::Algorithm("convex hull construction failed".to_string())))
}

/// How many times a rejected hull is rebuilt with a wider tolerance
pub const TOLERANCE_RETRIES: usize = 3;

/// Faces this far behind the eye, as a fraction of ε, still count as seen
const COPLANAR_FRACTION: f64 = 1e-3;

/// Slack, in multiples of ε, allowed by the final convexity and coverage check
const VERIFY_SLACK: f64 = 4.0;

/// Rounds of pinch repair before a horizon is given up on
const MAX_HORIZON_REPAIRS: usize = 8;

fn build_attempt(points: &[Point3d], tolerance: f64, merge_coplanar: bool) -> Result<HullResult> {
    let mut hull = Quickhull::new(points, tolerance);
    hull.build_initial_simplex()?;
    hull.iterate()?;
    let triangles = hull.triangles();

    if merge_coplanar {
        match merge_coplanar_facets(&triangles, points, tolerance) {
            Some(polygons) => {
                let merged = compact(points, &fan_triangulate(&polygons), tolerance);
                match verify(&merged, points) {
                    Ok(()) => return Ok(merged),
                    Err(err) => debug!(error = %err, "merged facets rejected, keeping raw triangulation"),
                }
            }
            None => debug!("coplanar facet merge fell back to raw triangulation"),
        }
    }

    let raw = compact(points, &triangles, tolerance);
    verify(&raw, points)?;
    Ok(raw)
}

/// Reject shells that are open, turned inside out, dented, or that leave
/// discarded input outside.
fn verify(hull: &HullResult, points: &[Point3d]) -> Result<()> {
    let mesh = &hull.mesh;
    if !mesh.is_closed() {
        return Err(Error::Algorithm(
            "convex hull construction produced an open shell".to_string(),
        ));
    }
    if mesh.volume() <= 0.0 {
        return Err(Error::Algorithm("convex hull encloses no volume".to_string()));
    }

    let centroid = mesh.centroid();
    if face_planes(mesh)
        .iter()
        .any(|plane| plane.signed_distance(&centroid) >= 0.0)
    {
        return Err(Error::Algorithm("convex hull has an inward facing face".to_string()));
    }

    let slack = VERIFY_SLACK * hull.tolerance;
    if !is_convex(mesh, slack) {
        return Err(Error::Algorithm("convex hull is folded".to_string()));
    }

    let discarded: Vec<Point3d> = hull.interior.iter().map(|&i| points[i]).collect();
    let outside = max_outside_distance(mesh, &discarded);
    if outside > slack {
        return Err(Error::Algorithm(format!(
            "convex hull leaves an input point {} outside",
            outside
        )));
    }
    Ok(())
}

/// A triangular face of the hull under construction
#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    /// Unit outward normal (zero for a degenerate sliver)
    normal: Vector3d,
    /// Plane offset: `normal · p` for any point on the face
    offset: f64,
    outside: Vec<usize>,
    alive: bool,
}

impl HullFace {
    fn new(vertices: [usize; 3], points: &[Point3d]) -> Self {
        let [a, b, c] = vertices;
        let raw = (points[b] - points[a]).cross(&(points[c] - points[a]));
        let length = raw.norm();
        let normal = if length > f64::MIN_POSITIVE {
            raw / length
        } else {
            Vector3d::zeros()
        };
        Self {
            vertices,
            normal,
            offset: normal.dot(&points[a].coords),
            outside: Vec::new(),
            alive: true,
        }
    }

    #[inline]
    fn signed_distance(&self, point: &Point3d) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn directed_edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

struct Quickhull<'a> {
    points: &'a [Point3d],
    /// Outside-set threshold ε
    tolerance: f64,
    /// Visibility band: faces with the eye less than this far behind them
    /// are replaced along with the faces that truly see it
    coplanar: f64,
    faces: Vec<HullFace>,
    /// Directed edge -> face owning it
    edges: HashMap<(usize, usize), usize>,
    pending: Vec<usize>,
}

impl<'a> Quickhull<'a> {
    fn new(points: &'a [Point3d], tolerance: f64) -> Self {
        Self {
            points,
            tolerance,
            coplanar: tolerance * COPLANAR_FRACTION,
            faces: Vec::new(),
            edges: HashMap::new(),
            pending: Vec::new(),
        }
    }

    fn add_face(&mut self, vertices: [usize; 3]) -> Result<usize> {
        let id = self.faces.len();
        let face = HullFace::new(vertices, self.points);
        for (a, b) in face.directed_edges() {
            if self.edges.insert((a, b), id).is_some() {
                return Err(Error::Algorithm(format!(
                    "hull edge ({}, {}) claimed by two faces",
                    a, b
                )));
            }
        }
        self.faces.push(face);
        Ok(id)
    }

    fn remove_face(&mut self, id: usize) -> Vec<usize> {
        let edges = self.faces[id].directed_edges();
        for edge in edges {
            if self.edges.get(&edge) == Some(&id) {
                self.edges.remove(&edge);
            }
        }
        self.faces[id].alive = false;
        std::mem::take(&mut self.faces[id].outside)
    }

    /// Face across the directed edge `(a, b)`
    fn twin_face(&self, a: usize, b: usize) -> Result<usize> {
        self.edges
            .get(&(b, a))
            .copied()
            .ok_or_else(|| Error::Algorithm(format!("hull edge ({}, {}) has no twin", a, b)))
    }

    /// Push a point onto the first of `candidates` it lies outside of.
    /// Returns false if the point is inside (or on) all of them.
    fn assign(&mut self, point: usize, candidates: &[usize]) -> bool {
        for &fi in candidates {
            if self.faces[fi].signed_distance(&self.points[point]) > self.tolerance {
                self.faces[fi].outside.push(point);
                return true;
            }
        }
        false
    }

    fn build_initial_simplex(&mut self) -> Result<()> {
        let points = self.points;
        let eps = self.tolerance;

        // Extreme points on each axis
        let mut extremes = [0usize; 6];
        for (i, p) in points.iter().enumerate() {
            for axis in 0..3 {
                if p[axis] < points[extremes[axis * 2]][axis] {
                    extremes[axis * 2] = i;
                }
                if p[axis] > points[extremes[axis * 2 + 1]][axis] {
                    extremes[axis * 2 + 1] = i;
                }
            }
        }

        // Two extremes farthest apart
        let mut best = (extremes[0], extremes[1]);
        let mut best_dist = -1.0;
        for (i, &a) in extremes.iter().enumerate() {
            for &b in &extremes[i + 1..] {
                let d = (points[a] - points[b]).norm_squared();
                if d > best_dist {
                    best_dist = d;
                    best = (a, b);
                }
            }
        }
        let (p0, p1) = best;
        if best_dist.sqrt() <= eps {
            return Err(Error::degenerate("all points coincide"));
        }

        // Point farthest from the line p0-p1
        let dir = (points[p1] - points[p0]).normalize();
        let (p2, line_dist) = farthest(points, |p| {
            let v = p - points[p0];
            (v - dir * v.dot(&dir)).norm()
        });
        if line_dist <= eps {
            return Err(Error::degenerate("all points are collinear"));
        }

        // Point farthest from the plane p0-p1-p2
        let normal = (points[p1] - points[p0])
            .cross(&(points[p2] - points[p0]))
            .normalize();
        let (p3, plane_dist) = farthest(points, |p| normal.dot(&(p - points[p0])).abs());
        if plane_dist <= eps {
            return Err(Error::degenerate(
                "all points are coplanar; a flat hull has no volume",
            ));
        }

        // Orient so the apex sits below the base triangle
        let (a, mut b, mut c, d) = (p0, p1, p2, p3);
        if normal.dot(&(points[d] - points[a])) > 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        let initial = [
            self.add_face([a, b, c])?,
            self.add_face([a, d, b])?,
            self.add_face([b, d, c])?,
            self.add_face([c, d, a])?,
        ];

        for i in 0..points.len() {
            if i == a || i == b || i == c || i == d {
                continue;
            }
            self.assign(i, &initial);
        }
        self.pending.extend(initial);
        Ok(())
    }

    fn iterate(&mut self) -> Result<()> {
        let max_iterations = self.points.len() * 4 + 16;
        let mut iteration = 0;

        while let Some(fi) = self.pending.pop() {
            if !self.faces[fi].alive || self.faces[fi].outside.is_empty() {
                continue;
            }
            iteration += 1;
            if iteration > max_iterations {
                return Err(Error::Algorithm(
                    "quickhull failed to converge".to_string(),
                ));
            }

            let face = &self.faces[fi];
            let eye = face
                .outside
                .iter()
                .copied()
                .max_by(|&x, &y| {
                    face.signed_distance(&self.points[x])
                        .total_cmp(&face.signed_distance(&self.points[y]))
                })
                .ok_or_else(|| Error::Algorithm("face lost its outside set".to_string()))?;
            let eye_point = self.points[eye];

            let (visible, horizon) = self.visible_region(fi, &eye_point)?;

            let mut orphans = Vec::new();
            for &v in &visible {
                orphans.extend(self.remove_face(v));
            }
            orphans.retain(|&p| p != eye);

            let mut new_faces = Vec::with_capacity(horizon.len());
            for &(a, b) in &horizon {
                new_faces.push(self.add_face([a, b, eye])?);
            }

            for p in orphans {
                self.assign(p, &new_faces);
            }
            self.pending.extend(new_faces);
        }

        Ok(())
    }

    /// Faces replaced by the eye, and the horizon loop bounding them.
    ///
    /// A face joins the region when the eye is in front of its plane or
    /// within the coplanar band behind it; every face left outside has the
    /// eye clearly behind it, so each new cone face meets its horizon
    /// neighbour at a convex edge. A pinched or holed region is grown
    /// around the offending vertices until its border is one simple loop.
    fn visible_region(
        &self,
        seed: usize,
        eye: &Point3d,
    ) -> Result<(Vec<usize>, Vec<(usize, usize)>)> {
        let threshold = -self.coplanar;
        let mut visible = vec![seed];
        let mut in_region: HashSet<usize> = HashSet::from([seed]);
        let mut cursor = 0;

        for _ in 0..=MAX_HORIZON_REPAIRS {
            while cursor < visible.len() {
                let current = visible[cursor];
                cursor += 1;
                for (a, b) in self.faces[current].directed_edges() {
                    let neighbor = self.twin_face(a, b)?;
                    if !in_region.contains(&neighbor)
                        && self.faces[neighbor].signed_distance(eye) > threshold
                    {
                        in_region.insert(neighbor);
                        visible.push(neighbor);
                    }
                }
            }

            let mut horizon = Vec::new();
            for &face in &visible {
                for (a, b) in self.faces[face].directed_edges() {
                    if !in_region.contains(&self.twin_face(a, b)?) {
                        horizon.push((a, b));
                    }
                }
            }

            let defects = horizon_defects(&horizon);
            if defects.is_empty() {
                if horizon.len() < 3 {
                    return Err(Error::Algorithm("eye sees the whole hull".to_string()));
                }
                return Ok((visible, horizon));
            }

            for (id, face) in self.faces.iter().enumerate() {
                if face.alive
                    && !in_region.contains(&id)
                    && face.vertices.iter().any(|v| defects.contains(v))
                {
                    in_region.insert(id);
                    visible.push(id);
                }
            }
        }

        Err(Error::Algorithm("horizon is not a simple loop".to_string()))
    }

    fn triangles(&self) -> Vec<[usize; 3]> {
        self.faces
            .iter()
            .filter(|f| f.alive)
            .map(|f| f.vertices)
            .collect()
    }
}

/// Vertices that keep `horizon` from being a single simple loop: pinch
/// points with two outgoing edges, or every vertex of the shorter loops
/// when the region has holes. Empty for a well-formed horizon.
fn horizon_defects(horizon: &[(usize, usize)]) -> Vec<usize> {
    let mut next: HashMap<usize, usize> = HashMap::with_capacity(horizon.len());
    let mut pinched = Vec::new();
    for &(a, b) in horizon {
        if next.insert(a, b).is_some() {
            pinched.push(a);
        }
    }
    if !pinched.is_empty() {
        return pinched;
    }

    let mut seen = HashSet::with_capacity(horizon.len());
    let mut loops: Vec<Vec<usize>> = Vec::new();
    for &(start, _) in horizon {
        let mut cycle = Vec::new();
        let mut current = start;
        while seen.insert(current) {
            cycle.push(current);
            match next.get(&current) {
                Some(&following) => current = following,
                None => break,
            }
        }
        if !cycle.is_empty() {
            loops.push(cycle);
        }
    }
    if loops.len() <= 1 {
        return Vec::new();
    }
    loops.sort_by_key(|cycle| std::cmp::Reverse(cycle.len()));
    loops.into_iter().skip(1).flatten().collect()
}

/// Index and value of the point maximizing `metric`
fn farthest<F>(points: &[Point3d], metric: F) -> (usize, f64)
where
    F: Fn(&Point3d) -> f64,
{
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, metric(p)))
        .fold((0, f64::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        })
}

fn fan_triangulate(polygons: &[Vec<usize>]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::new();
    for polygon in polygons {
        for i in 1..polygon.len() - 1 {
            triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }
    triangles
}

/// Build the output mesh over the referenced points only and classify the input
fn compact(points: &[Point3d], triangles: &[[usize; 3]], tolerance: f64) -> HullResult {
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut vertex_sources = Vec::new();
    let mut vertices = Vec::new();
    let mut faces = Vec::with_capacity(triangles.len());

    for tri in triangles {
        let mut face = Vec::with_capacity(3);
        for &src in tri {
            let idx = *remap.entry(src).or_insert_with(|| {
                vertex_sources.push(src);
                vertices.push(points[src]);
                vertices.len() - 1
            });
            face.push(idx);
        }
        faces.push(face);
    }

    let interior: Vec<usize> = (0..points.len())
        .filter(|i| !remap.contains_key(i))
        .collect();

    HullResult {
        mesh: Mesh::from_vertices_and_faces(vertices, faces),
        boundary_count: vertex_sources.len(),
        interior_count: interior.len(),
        vertex_sources,
        interior,
        tolerance,
    }
}
