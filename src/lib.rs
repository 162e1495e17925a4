//! # Armature
//!
//! Foundational data structures for automatic rigging: a half-edge triangle
//! mesh and a dual-resolution skeleton graph.
//!
//! Later rigging stages (distance fields, skeleton embedding, attachment
//! weights) read both structures side by side; the two modules do not depend on
//! each other.
//!
//! ## Features
//!
//! - **Half-edge mesh**: face triplets with twin links, built from polygon soup
//!   with duplicate-face repair and integrity validation
//! - **Mesh queries**: connectivity, vertex normals, bounding-box normalization
//!   with an invertible recorded transform
//! - **Skeleton graphs**: full joint trees declared by name, compressed trees
//!   without chain joints, symmetry and foot/fat tags, bone-length fractions
//! - **Templates**: human, quadruped, horse and centaur skeletons, plus a
//!   joint-list file loader
//!
//! ## Building Meshes
//!
//! ```
//! use armature::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     vec![0, 2, 1], // bottom
//!     vec![0, 1, 3], // front
//!     vec![1, 2, 3], // right
//!     vec![2, 0, 3], // left
//! ];
//!
//! let mut mesh: Mesh = Mesh::from_polygons(&vertices, &faces).unwrap();
//! assert!(mesh.integrity_check());
//! assert!(mesh.is_connected());
//!
//! mesh.compute_vertex_normals();
//! mesh.normalize_bounding_box();
//! ```
//!
//! ## Skeletons
//!
//! ```
//! use armature::prelude::*;
//!
//! let mut skeleton = human().unwrap();
//! assert_eq!(skeleton.num_joints(), 18);
//! assert_eq!(skeleton.num_compressed(), 7);
//!
//! let foot = skeleton.joint_for_name("lfoot").unwrap();
//! assert!(skeleton.c_feet()[skeleton.fc_map()[foot].unwrap()]);
//!
//! skeleton.scale(2.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod mesh;
pub mod skeleton;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use armature::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result, SkeletonError, SkeletonResult};
    pub use crate::mesh::{
        fix_dup_faces, FaceId, HalfEdge, HalfEdgeId, Mesh, MeshIndex, NormalWeighting,
        TopologyOptions, TopologyReport, Vertex, VertexId,
    };
    pub use crate::skeleton::{
        centaur, horse, human, load_skeleton, parse_skeleton, quad, CompressedSkeleton, PtGraph,
        Skeleton, SkeletonBuilder, Template,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
