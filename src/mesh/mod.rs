//! Mesh topology engine.
//!
//! This module provides the half-edge mesh representation used by the rigging
//! stages: vertex positions and normals plus a flat list of half-edges grouped
//! in face triplets.
//!
//! # Overview
//!
//! The primary type is [`Mesh`]. It is built once from polygon soup, repaired
//! (duplicate faces are dropped), validated, and then only read by downstream
//! consumers, apart from normal computation and bounding-box normalization.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face (a half-edge triplet)
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use armature::mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let polygons = vec![vec![0, 1, 2, 3]];
//!
//! let mesh: Mesh = Mesh::from_polygons(&vertices, &polygons).unwrap();
//! assert_eq!(mesh.num_faces(), 2);
//! assert!(mesh.integrity_check());
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{fix_dup_faces, triangulate, TopologyOptions, TopologyReport};
pub use halfedge::{HalfEdge, Mesh, NormalWeighting, Vertex, DEFAULT_BOX_FILL};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
