//! Mesh construction utilities.
//!
//! This module builds the half-edge list of a [`Mesh`] from polygon soup, as
//! handed over by mesh file readers. Construction always goes through
//! [`Mesh::compute_topology`], which repairs duplicate faces, links twins, sorts
//! the half-edges into face triplets, and validates the result.
//!
//! Polygons with more than three vertices are fan-triangulated around their
//! first vertex.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use tracing::{debug, warn};

use super::halfedge::{HalfEdge, Mesh, Vertex};
use super::index::{HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Options for [`Mesh::compute_topology`].
#[derive(Debug, Clone)]
pub struct TopologyOptions {
    /// Remove duplicate faces before linking twins (default: true).
    pub remove_duplicate_faces: bool,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            remove_duplicate_faces: true,
        }
    }
}

impl TopologyOptions {
    /// Set whether duplicate faces are removed before linking twins.
    pub fn with_duplicate_removal(mut self, remove: bool) -> Self {
        self.remove_duplicate_faces = remove;
        self
    }
}

/// Summary of a topology rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyReport {
    /// Faces dropped because an identical face came earlier.
    pub duplicate_faces_removed: usize,
    /// Undirected edges left without twins because they are shared by more than
    /// two half-edges or by two half-edges running the same direction.
    pub non_manifold_edges: usize,
    /// Half-edges left without a twin for any reason.
    pub boundary_edges: usize,
}

/// Fan-triangulate polygons, dropping those with fewer than three vertices.
pub fn triangulate(polygons: &[Vec<usize>]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(polygons.len());

    for (pi, polygon) in polygons.iter().enumerate() {
        if polygon.len() < 3 {
            warn!(polygon = pi, len = polygon.len(), "dropping polygon with fewer than 3 vertices");
            continue;
        }
        for i in 1..polygon.len() - 1 {
            triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    triangles
}

/// Remove faces that repeat the vertex set of an earlier face.
///
/// Two triangles are duplicates when they use the same three vertices, whatever
/// their rotation or winding. The first occurrence is kept.
///
/// Returns the number of faces removed.
///
/// # Example
/// ```
/// use armature::mesh::fix_dup_faces;
///
/// let mut faces = vec![[0, 1, 2], [1, 2, 0], [0, 2, 1], [0, 1, 3]];
/// assert_eq!(fix_dup_faces(&mut faces), 2);
/// assert_eq!(faces, vec![[0, 1, 2], [0, 1, 3]]);
/// ```
pub fn fix_dup_faces(faces: &mut Vec<[usize; 3]>) -> usize {
    let original_count = faces.len();
    let mut seen: HashSet<[usize; 3]> = HashSet::with_capacity(faces.len());

    faces.retain(|face| {
        let mut key = *face;
        key.sort_unstable();
        seen.insert(key)
    });

    let removed = original_count - faces.len();
    if removed > 0 {
        debug!(removed, "removed duplicate faces");
    }
    removed
}

/// Fail when `count` elements cannot all get a valid index of type `I`.
fn check_capacity<I: MeshIndex>(element: &'static str, count: usize) -> Result<()> {
    let capacity = I::MAX.to_usize().saturating_add(1);
    if count > capacity {
        return Err(MeshError::IndexOverflow {
            element,
            count,
            capacity,
        });
    }
    Ok(())
}

/// Canonical key for the undirected edge between two vertices.
#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl<I: MeshIndex> Mesh<I> {
    /// Build a mesh from vertex positions and triangles.
    ///
    /// # Example
    /// ```
    /// use armature::mesh::Mesh;
    /// use nalgebra::Point3;
    ///
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.5, 1.0, 0.0),
    /// ];
    /// let faces = vec![[0, 1, 2]];
    ///
    /// let mesh: Mesh = Mesh::from_triangles(&vertices, &faces).unwrap();
    /// assert_eq!(mesh.num_vertices(), 3);
    /// assert_eq!(mesh.num_faces(), 1);
    /// assert_eq!(mesh.boundary_edge_count(), 3);
    /// ```
    pub fn from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Self> {
        let mut mesh = Self::from_raw_triangles(vertices, faces)?;
        mesh.compute_topology(&TopologyOptions::default())?;
        Ok(mesh)
    }

    /// Build a mesh from vertex positions and polygons of any size.
    ///
    /// Polygons are fan-triangulated; see [`triangulate`].
    pub fn from_polygons(vertices: &[Point3<f64>], polygons: &[Vec<usize>]) -> Result<Self> {
        Self::from_polygons_with(vertices, polygons, &TopologyOptions::default())
    }

    /// Build a mesh from polygons with explicit topology options.
    pub fn from_polygons_with(
        vertices: &[Point3<f64>],
        polygons: &[Vec<usize>],
        options: &TopologyOptions,
    ) -> Result<Self> {
        let mut mesh = Self::from_raw_triangles(vertices, &triangulate(polygons))?;
        mesh.compute_topology(options)?;
        Ok(mesh)
    }

    /// Store vertices and unlinked face triplets.
    ///
    /// Only element counts are checked here; everything else is left to
    /// [`compute_topology`](Mesh::compute_topology).
    fn from_raw_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Self> {
        check_capacity::<I>("vertices", vertices.len())?;
        check_capacity::<I>("half-edges", faces.len().saturating_mul(3))?;

        let nv = vertices.len();
        let mut mesh = Self::new();
        mesh.vertices = vertices.iter().map(|&p| Vertex::new(p)).collect();
        mesh.edges = faces
            .iter()
            .enumerate()
            .flat_map(|(f, face)| {
                (0..3).map(move |k| HalfEdge {
                    vertex: if face[k] < nv { VertexId::new(face[k]) } else { VertexId::invalid() },
                    prev: HalfEdgeId::new(3 * f + (k + 2) % 3),
                    twin: HalfEdgeId::invalid(),
                })
            })
            .collect();
        Ok(mesh)
    }

    /// Read the faces back out of the half-edge triplets.
    ///
    /// Heads that were never valid are reported as `usize::MAX`, which keeps them
    /// out of range for the rebuild.
    pub fn face_list(&self) -> Vec<[usize; 3]> {
        self.face_ids()
            .map(|f| self.face_triangle(f).map(|v| v.get().unwrap_or(usize::MAX)))
            .collect()
    }

    /// Rebuild the half-edge topology from the current faces.
    ///
    /// Runs duplicate-face removal, half-edge construction with twin linking,
    /// [`sort_edges`](Mesh::sort_edges), and finally the integrity check. A mesh
    /// that still fails the check after repair is rejected with
    /// [`MeshError::IntegrityCheckFailed`].
    pub fn compute_topology(&mut self, options: &TopologyOptions) -> Result<TopologyReport> {
        let mut faces = self.face_list();
        let duplicate_faces_removed = if options.remove_duplicate_faces {
            fix_dup_faces(&mut faces)
        } else {
            0
        };

        let non_manifold_edges = self.build_halfedges(&faces);
        self.sort_edges()?;

        if let Some(reason) = self.integrity_violation() {
            warn!(%reason, "topology rebuild produced an invalid mesh");
            return Err(MeshError::IntegrityCheckFailed { reason });
        }

        let report = TopologyReport {
            duplicate_faces_removed,
            non_manifold_edges,
            boundary_edges: self.boundary_edge_count(),
        };
        debug!(
            vertices = self.num_vertices(),
            faces = self.num_faces(),
            boundary_edges = report.boundary_edges,
            "computed mesh topology"
        );
        Ok(report)
    }

    /// Create face triplets and link twins. Returns the number of undirected
    /// edges that could not be paired.
    fn build_halfedges(&mut self, faces: &[[usize; 3]]) -> usize {
        let nv = self.vertices.len();
        let mut edges: Vec<HalfEdge<I>> = Vec::with_capacity(faces.len() * 3);
        // Undirected edge -> half-edges running along it.
        let mut edge_map: HashMap<(usize, usize), Vec<usize>> = HashMap::new();

        for v in &mut self.vertices {
            v.edge = HalfEdgeId::invalid();
        }

        for (f, face) in faces.iter().enumerate() {
            for k in 0..3 {
                let e = 3 * f + k;
                let head = face[k];
                let tail = face[(k + 2) % 3];
                edges.push(HalfEdge {
                    vertex: if head < nv { VertexId::new(head) } else { VertexId::invalid() },
                    prev: HalfEdgeId::new(3 * f + (k + 2) % 3),
                    twin: HalfEdgeId::invalid(),
                });
                if tail < nv {
                    self.vertices[tail].edge = HalfEdgeId::new(e);
                }
                edge_map.entry(edge_key(tail, head)).or_default().push(e);
            }
        }

        let tail_of = |e: usize| faces[e / 3][(e % 3 + 2) % 3];
        let mut non_manifold = 0;

        for (&(a, b), shared) in &edge_map {
            match shared.as_slice() {
                [_] => {}
                &[e0, e1] if tail_of(e0) != tail_of(e1) => {
                    edges[e0].twin = HalfEdgeId::new(e1);
                    edges[e1].twin = HalfEdgeId::new(e0);
                }
                _ => {
                    warn!(v0 = a, v1 = b, halfedges = shared.len(), "edge cannot be paired");
                    non_manifold += 1;
                }
            }
        }

        self.edges = edges;
        non_manifold
    }

    /// Reorder half-edges so every face's three half-edges are contiguous.
    ///
    /// After sorting, `prev(3f + k) == 3f + (k + 2) % 3` for every face `f`.
    /// Twin and vertex pointers are remapped. Already sorted meshes are left in
    /// the same order.
    pub fn sort_edges(&mut self) -> Result<()> {
        let n = self.edges.len();
        if n % 3 != 0 {
            return Err(MeshError::InvalidState(format!(
                "{} half-edges cannot form triangles",
                n
            )));
        }

        let prev_of = |e: usize| -> Result<usize> {
            self.edges[e]
                .prev
                .get()
                .filter(|&p| p < n)
                .ok_or_else(|| {
                    MeshError::InvalidState(format!("half-edge {} has no valid prev", e))
                })
        };

        let mut order = Vec::with_capacity(n);
        let mut placed = vec![false; n];
        for e in 0..n {
            if placed[e] {
                continue;
            }
            let p = prev_of(e)?;
            let pp = prev_of(p)?;
            if prev_of(pp)? != e || p == e {
                return Err(MeshError::InvalidState(format!(
                    "half-edge {} is not part of a triangle",
                    e
                )));
            }
            for x in [e, pp, p] {
                if placed[x] {
                    return Err(MeshError::InvalidState(format!(
                        "half-edge {} belongs to two faces",
                        x
                    )));
                }
                placed[x] = true;
                order.push(x);
            }
        }

        let mut new_index = vec![0; n];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }
        let remap = |id: HalfEdgeId<I>| match id.get() {
            Some(i) if i < n => HalfEdgeId::new(new_index[i]),
            _ => id,
        };

        let sorted: Vec<HalfEdge<I>> = order
            .iter()
            .map(|&old| {
                let he = self.edges[old];
                HalfEdge {
                    vertex: he.vertex,
                    prev: remap(he.prev),
                    twin: remap(he.twin),
                }
            })
            .collect();
        self.edges = sorted;

        for v in &mut self.vertices {
            v.edge = remap(v.edge);
        }

        Ok(())
    }
}
