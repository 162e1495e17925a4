//! Half-edge mesh data structure.
//!
//! This module provides a compact half-edge representation for triangle meshes,
//! the layout consumed by the rigging stages downstream of this crate.
//!
//! # Structure
//!
//! - Half-edges are stored in **triplets**: half-edges `3f`, `3f + 1` and `3f + 2`
//!   bound face `f`, counter-clockwise
//! - Each half-edge knows its **head vertex** (the vertex it points to), its
//!   **prev** half-edge in the same face, and its **twin** on the neighboring face
//! - The tail of a half-edge is the head of its `prev`
//! - Each vertex stores one outgoing half-edge, i.e. a half-edge whose `prev`
//!   points at the vertex
//!
//! # Boundary Handling
//!
//! Unlike a full DCEL there are no boundary half-edges: a half-edge on the mesh
//! boundary simply has an invalid twin.

use std::collections::VecDeque;

use nalgebra::{Point3, Vector3};
use tracing::warn;

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Fraction of the canonical unit cube filled by the longest bounding-box side
/// after [`Mesh::normalize_bounding_box`].
pub const DEFAULT_BOX_FILL: f64 = 0.9;

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// The vertex normal, zero until [`Mesh::compute_vertex_normals`] runs.
    pub normal: Vector3<f64>,

    /// A half-edge whose predecessor's head is this vertex.
    /// Invalid for vertices referenced by no face.
    pub edge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            edge: HalfEdgeId::invalid(),
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge points to.
    pub vertex: VertexId<I>,

    /// The previous half-edge around the face. Since faces are triangles,
    /// the next half-edge is `prev(prev(e))`.
    pub prev: HalfEdgeId<I>,

    /// The opposite half-edge on the neighboring face.
    /// Invalid on the mesh boundary.
    pub twin: HalfEdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            vertex: VertexId::invalid(),
            prev: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.twin.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// How face normals are combined into vertex normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalWeighting {
    /// Each incident face contributes proportionally to its area.
    #[default]
    Area,
    /// Each non-degenerate incident face contributes its unit normal.
    Uniform,
}

/// A triangle mesh stored as a flat half-edge list.
///
/// The mesh also records the cumulative transform applied by
/// [`normalize_bounding_box`](Mesh::normalize_bounding_box) so results computed in
/// normalized space can be mapped back with [`to_original`](Mesh::to_original).
#[derive(Debug, Clone)]
pub struct Mesh<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges in the mesh, grouped in face triplets.
    pub(crate) edges: Vec<HalfEdge<I>>,

    /// Translation applied after scaling by the bounding-box normalization.
    pub(crate) to_add: Vector3<f64>,

    /// Uniform scale applied by the bounding-box normalization.
    pub(crate) scale: f64,
}

impl<I: MeshIndex> Default for Mesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> Mesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            to_add: Vector3::zeros(),
            scale: 1.0,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces (complete half-edge triplets).
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.edges.len() / 3
    }

    /// All vertices, indexed by [`VertexId`].
    #[inline]
    pub fn vertices(&self) -> &[Vertex<I>] {
        &self.vertices
    }

    /// All half-edges, indexed by [`HalfEdgeId`].
    #[inline]
    pub fn edges(&self) -> &[HalfEdge<I>] {
        &self.edges
    }

    /// Translation recorded by bounding-box normalization.
    #[inline]
    pub fn to_add(&self) -> Vector3<f64> {
        self.to_add
    }

    /// Uniform scale recorded by bounding-box normalization.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.edges[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Get the normal of a vertex.
    #[inline]
    pub fn normal(&self, v: VertexId<I>) -> &Vector3<f64> {
        &self.vertex(v).normal
    }

    // ==================== Topology Queries ====================

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn head(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).vertex
    }

    /// Get the vertex a half-edge starts from.
    #[inline]
    pub fn tail(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.head(self.prev(he))
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.prev(self.prev(he))
    }

    /// Get the twin (opposite) half-edge, invalid on the boundary.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        he.face()
    }

    /// Check if a half-edge lies on the mesh boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Count half-edges without a twin.
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|he| he.is_boundary()).count()
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.edges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.num_faces()).map(FaceId::new)
    }

    /// Get the three vertices of a face, counter-clockwise.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        f.halfedges().map(|he| self.head(he))
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        self.face_triangle(f).map(|v| *self.position(v))
    }

    /// Undirected vertex adjacency induced by the half-edges.
    ///
    /// Half-edges with an out-of-range endpoint are ignored.
    pub fn vertex_adjacency(&self) -> Vec<Vec<VertexId<I>>> {
        let n = self.vertices.len();
        let mut adjacency: Vec<Vec<VertexId<I>>> = vec![Vec::new(); n];

        for (i, he) in self.edges.iter().enumerate() {
            let Some(prev) = he.prev.get().filter(|&p| p < self.edges.len()) else {
                continue;
            };
            let (Some(a), Some(b)) = (self.edges[prev].vertex.get(), he.vertex.get()) else {
                continue;
            };
            if a >= n || b >= n || a == b {
                continue;
            }
            // Interior edges are seen from both sides; keep the one from the lower half-edge.
            if let Some(twin) = he.twin.get() {
                if twin < i {
                    continue;
                }
            }
            adjacency[a].push(VertexId::new(b));
            adjacency[b].push(VertexId::new(a));
        }

        adjacency
    }

    // ==================== Connectivity ====================

    /// Count connected components of the vertex adjacency graph.
    ///
    /// Vertices referenced by no face form components of their own.
    pub fn connected_components(&self) -> usize {
        let adjacency = self.vertex_adjacency();
        let mut visited = vec![false; adjacency.len()];
        let mut queue = VecDeque::new();
        let mut components = 0;

        for start in 0..adjacency.len() {
            if visited[start] {
                continue;
            }
            components += 1;
            visited[start] = true;
            queue.push_back(start);

            while let Some(v) = queue.pop_front() {
                for w in &adjacency[v] {
                    if !visited[w.index()] {
                        visited[w.index()] = true;
                        queue.push_back(w.index());
                    }
                }
            }
        }

        components
    }

    /// Returns true if the mesh consists of a single connected component.
    ///
    /// A disconnected mesh is still a valid mesh, so this only warns.
    pub fn is_connected(&self) -> bool {
        let components = self.connected_components();
        if components != 1 {
            warn!(components, "mesh is not a single connected component");
        }
        components == 1
    }

    // ==================== Geometry ====================

    /// Compute the unnormalized normal of a face (twice its area in length).
    pub fn face_area_vector(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Compute the unit normal of a face, zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.face_area_vector(f)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        0.5 * self.face_area_vector(f).norm()
    }

    /// Compute area-weighted vertex normals.
    pub fn compute_vertex_normals(&mut self) {
        self.compute_vertex_normals_with(NormalWeighting::Area);
    }

    /// Compute vertex normals from incident face normals.
    ///
    /// Degenerate faces contribute nothing, and a vertex without any
    /// non-degenerate incident face gets a zero normal.
    pub fn compute_vertex_normals_with(&mut self, weighting: NormalWeighting) {
        let mut sums = vec![Vector3::<f64>::zeros(); self.vertices.len()];

        for f in self.face_ids() {
            let cross = self.face_area_vector(f);
            let length = cross.norm();
            if !length.is_finite() || length <= f64::EPSILON {
                continue;
            }
            let contribution = match weighting {
                NormalWeighting::Area => cross,
                NormalWeighting::Uniform => cross / length,
            };
            for v in self.face_triangle(f) {
                sums[v.index()] += contribution;
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        }
    }

    /// Compute the axis-aligned bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Fit the mesh into the unit cube with the default fill.
    ///
    /// See [`normalize_bounding_box_to`](Mesh::normalize_bounding_box_to).
    pub fn normalize_bounding_box(&mut self) {
        self.apply_box_fit(DEFAULT_BOX_FILL);
    }

    /// Uniformly scale and translate the mesh so its longest bounding-box side
    /// spans `fill` and its box is centered at `(0.5, 0.5, 0.5)`.
    ///
    /// The transform is composed into [`scale`](Mesh::scale) and
    /// [`to_add`](Mesh::to_add), so repeated calls stay invertible. Empty meshes
    /// and meshes collapsed to a point are left untouched.
    pub fn normalize_bounding_box_to(&mut self, fill: f64) -> Result<()> {
        if fill.is_nan() || fill <= 0.0 || fill > 1.0 {
            return Err(MeshError::invalid_param("fill", fill, "must be in (0, 1]"));
        }
        self.apply_box_fit(fill);
        Ok(())
    }

    fn apply_box_fit(&mut self, fill: f64) {
        let Some((min, max)) = self.bounding_box() else {
            return;
        };
        let extent = (max - min).max();
        if !extent.is_finite() || extent <= f64::EPSILON {
            warn!("bounding box has zero extent, skipping normalization");
            return;
        }

        let scale = fill / extent;
        let center = nalgebra::center(&min, &max);
        let offset = Vector3::repeat(0.5) - center.coords * scale;

        for v in &mut self.vertices {
            v.position = Point3::from(v.position.coords * scale + offset);
        }

        self.to_add = offset + self.to_add * scale;
        self.scale *= scale;
    }

    /// Map a point from the original mesh space into normalized space.
    pub fn to_normalized(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(p.coords * self.scale + self.to_add)
    }

    /// Map a point from normalized space back into the original mesh space.
    pub fn to_original(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from((p.coords - self.to_add) / self.scale)
    }

    // ==================== Validation ====================

    /// Check that every structural invariant holds.
    ///
    /// Indices are range-checked before use, so a corrupt mesh never panics here.
    pub fn integrity_check(&self) -> bool {
        match self.integrity_violation() {
            Some(reason) => {
                warn!(%reason, "mesh integrity check failed");
                false
            }
            None => true,
        }
    }

    /// Describe the first broken invariant, if any.
    pub(crate) fn integrity_violation(&self) -> Option<String> {
        let nv = self.vertices.len();
        let ne = self.edges.len();

        if ne % 3 != 0 {
            return Some(format!("{} half-edges do not form whole triplets", ne));
        }

        for (i, he) in self.edges.iter().enumerate() {
            match he.vertex.get() {
                Some(v) if v < nv => {}
                _ => return Some(format!("half-edge {} has head {:?} out of range", i, he.vertex)),
            }
            let expected_prev = i - i % 3 + (i + 2) % 3;
            if he.prev.get() != Some(expected_prev) {
                return Some(format!(
                    "half-edge {} has prev {:?}, expected {}",
                    i, he.prev, expected_prev
                ));
            }
        }

        for (i, he) in self.edges.iter().enumerate() {
            if !he.twin.is_valid() {
                continue;
            }
            let t = he.twin.index();
            if t >= ne {
                return Some(format!("half-edge {} has twin {} out of range", i, t));
            }
            if self.edges[t].twin.get() != Some(i) {
                return Some(format!("half-edge {} and its twin {} are not paired", i, t));
            }
            // Opposite half-edges bound the same undirected edge in reverse.
            let twin_tail = self.edges[self.edges[t].prev.index()].vertex;
            if he.vertex != twin_tail {
                return Some(format!("half-edge {} and its twin {} disagree on endpoints", i, t));
            }
        }

        for f in 0..ne / 3 {
            let [a, b, c] = [
                self.edges[3 * f].vertex,
                self.edges[3 * f + 1].vertex,
                self.edges[3 * f + 2].vertex,
            ];
            if a == b || b == c || a == c {
                return Some(format!("face {} repeats a vertex", f));
            }
        }

        for (i, v) in self.vertices.iter().enumerate() {
            let Some(e) = v.edge.get() else {
                continue;
            };
            if e >= ne {
                return Some(format!("vertex {} points at half-edge {} out of range", i, e));
            }
            if self.edges[self.edges[e].prev.index()].vertex.get() != Some(i) {
                return Some(format!("vertex {} is not the tail of its half-edge {}", i, e));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        Mesh::from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::<u32>::from_coords(1.0, 2.0, 3.0);
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(v.normal, Vector3::zeros());
        assert!(!v.edge.is_valid());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.integrity_check());
        assert!(!mesh.is_connected());
        assert_eq!(mesh.scale(), 1.0);
    }

    #[test]
    fn test_navigation() {
        let mesh = tetrahedron();
        for he in mesh.halfedge_ids() {
            assert_eq!(mesh.next(mesh.prev(he)), he);
            let twin = mesh.twin(he);
            assert!(twin.is_valid());
            assert_eq!(mesh.head(he), mesh.tail(twin));
            assert_eq!(mesh.tail(he), mesh.head(twin));
        }
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.tail(mesh.vertex(v).edge), v);
        }
    }

    #[test]
    fn test_adjacency_counts_each_edge_once() {
        let mesh = tetrahedron();
        let adjacency = mesh.vertex_adjacency();
        for neighbors in &adjacency {
            assert_eq!(neighbors.len(), 3);
        }
    }

    #[test]
    fn test_vertex_normals_point_outward() {
        let mut mesh = tetrahedron();
        mesh.compute_vertex_normals();

        let centroid = Point3::new(0.5, 0.375, 0.25);
        for (v, vertex) in mesh.vertices().iter().enumerate() {
            assert!((vertex.normal.norm() - 1.0).abs() < 1e-12, "vertex {}", v);
            assert!(vertex.normal.dot(&(vertex.position - centroid)) > 0.0);
        }
    }

    #[test]
    fn test_degenerate_face_normal_is_skipped() {
        // Second face is collinear and must not poison vertex 0.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 3, 1]];
        let mut mesh: Mesh = Mesh::from_polygons(&vertices, &faces).unwrap();
        mesh.compute_vertex_normals_with(NormalWeighting::Uniform);

        for vertex in mesh.vertices() {
            assert!(vertex.normal.iter().all(|c| c.is_finite()));
        }
        assert!((mesh.normal(VertexId::new(0)).z - 1.0).abs() < 1e-12);
        assert_eq!(*mesh.normal(VertexId::new(3)), Vector3::zeros());
    }

    #[test]
    fn test_normalize_bounding_box() {
        let mut mesh = tetrahedron();
        let original: Vec<_> = mesh.vertices().iter().map(|v| v.position).collect();

        mesh.normalize_bounding_box();
        let (min, max) = mesh.bounding_box().unwrap();
        assert!(((max - min).max() - DEFAULT_BOX_FILL).abs() < 1e-12);
        let center = nalgebra::center(&min, &max);
        assert!((center - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-12);

        mesh.normalize_bounding_box_to(0.5).unwrap();
        for (p, vertex) in original.iter().zip(mesh.vertices()) {
            assert!((mesh.to_original(&vertex.position) - p).norm() < 1e-12);
            assert!((mesh.to_normalized(p) - vertex.position).norm() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_rejects_bad_fill() {
        let mut mesh = tetrahedron();
        assert!(mesh.normalize_bounding_box_to(0.0).is_err());
        assert!(mesh.normalize_bounding_box_to(1.5).is_err());
        assert_eq!(mesh.scale(), 1.0);
    }

    #[test]
    fn test_integrity_detects_broken_twin() {
        let mut mesh = tetrahedron();
        assert!(mesh.integrity_check());
        mesh.edges[0].twin = HalfEdgeId::new(1);
        assert!(!mesh.integrity_check());
    }
}
