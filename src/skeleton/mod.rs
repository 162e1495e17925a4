//! Skeleton graph model.
//!
//! Skeletons exist at two resolutions. The **full** tree is what a template or
//! file declares, joint by joint. The **compressed** tree drops every chain
//! joint, leaving the root, the leaves and the branch points; it is the search
//! space for embedding, while per-edge length fractions let the full tree be
//! rebuilt from a compressed embedding.
//!
//! # Construction
//!
//! ```
//! use armature::skeleton::SkeletonBuilder;
//! use nalgebra::Point3;
//!
//! let mut builder = SkeletonBuilder::new();
//! builder.make_joint("root", Point3::new(0.0, 0.0, 0.0), None).unwrap();
//! builder.make_joint("mid", Point3::new(0.0, -1.0, 0.0), Some("root")).unwrap();
//! builder.make_joint("tip", Point3::new(0.0, -2.0, 0.0), Some("mid")).unwrap();
//!
//! let mut compressed = builder.init_compressed().unwrap();
//! compressed.set_foot("tip").unwrap();
//! let skeleton = compressed.finish();
//!
//! assert_eq!(skeleton.num_compressed(), 2);
//! assert_eq!(skeleton.c_length()[1], 2.0);
//! ```
//!
//! Predefined templates live in [`templates`]; joint-list files are read by
//! [`load_skeleton`].

mod graph;
mod loader;
pub mod templates;
mod tree;

pub use graph::PtGraph;
pub use loader::{load_skeleton, parse_skeleton, ROOT_SENTINEL};
pub use templates::{centaur, horse, human, quad, Template, TEMPLATE_SCALE};
pub use tree::{CompressedSkeleton, Skeleton, SkeletonBuilder};
