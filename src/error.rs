//! Error types for armature.
//!
//! This module defines all error types used throughout the library. Mesh
//! operations report [`MeshError`]; skeleton construction and loading report
//! [`SkeletonError`].

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Result type alias using [`SkeletonError`].
pub type SkeletonResult<T> = std::result::Result<T, SkeletonError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The half-edge structure failed validation after a topology rebuild.
    #[error("mesh failed integrity check: {reason}")]
    IntegrityCheckFailed {
        /// The first invariant found to be broken.
        reason: String,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// The mesh has more elements than its index type can address.
    #[error("{count} {element} exceed the {capacity} addressable by the index type")]
    IndexOverflow {
        /// Which element kind overflowed.
        element: &'static str,
        /// Number of elements requested.
        count: usize,
        /// Largest count the index type supports.
        capacity: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Errors that can occur while building or loading a skeleton.
#[derive(Error, Debug)]
pub enum SkeletonError {
    /// A joint name was declared twice.
    #[error("joint '{0}' is already declared")]
    DuplicateJoint(String),

    /// A joint name was referenced before being declared.
    #[error("joint '{0}' is not declared")]
    UnknownJoint(String),

    /// A second parentless joint was declared.
    #[error("joint '{name}' has no parent but '{root}' is already the root")]
    RootAlreadyDeclared {
        /// The offending joint.
        name: String,
        /// The existing root.
        root: String,
    },

    /// A joint was declared as its own mirror image.
    #[error("joint '{0}' cannot be symmetric with itself")]
    SelfSymmetric(String),

    /// A tag was applied to a joint removed by compression.
    #[error("joint '{0}' is a chain joint and has no compressed index")]
    ElidedJoint(String),

    /// Compression was requested on a skeleton with no joints.
    #[error("skeleton has no joints")]
    EmptySkeleton,

    /// A compressed embedding does not match the compressed joint count.
    #[error("embedding has {actual} positions, compressed skeleton has {expected} joints")]
    EmbeddingSize {
        /// Number of compressed joints.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },

    /// A joint-list line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
