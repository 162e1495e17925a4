//! Point graphs: positioned vertices with undirected integer adjacency.

use nalgebra::Point3;

/// A graph whose vertices carry 3D positions.
///
/// Edges are stored symmetrically: if `b` is in `edges[a]`, then `a` is in `edges[b]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PtGraph {
    /// Vertex positions.
    pub verts: Vec<Point3<f64>>,
    /// Adjacency lists, one per vertex.
    pub edges: Vec<Vec<usize>>,
}

impl PtGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.verts.len()
    }

    /// Add an isolated vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.verts.push(position);
        self.edges.push(Vec::new());
        self.verts.len() - 1
    }

    /// Connect two existing vertices.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        self.edges[a].push(b);
        self.edges[b].push(a);
    }

    /// Number of neighbors of a vertex.
    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.edges[v].len()
    }

    /// Euclidean distance between two vertices.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        (self.verts[a] - self.verts[b]).norm()
    }

    /// Multiply every position by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for p in &mut self.verts {
            *p *= factor;
        }
    }
}
