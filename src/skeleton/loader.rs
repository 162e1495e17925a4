//! Joint-list skeleton files.
//!
//! Each line declares one joint as five whitespace-separated fields:
//!
//! ```text
//! name x y z parent
//! ```
//!
//! `parent` is `-1` for the root. Coordinates are used as written. Lines with
//! fewer than five fields are skipped; extra fields are ignored.

use std::fs;
use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use super::tree::{Skeleton, SkeletonBuilder};
use crate::error::{SkeletonError, SkeletonResult};

/// Parent field value marking the root joint.
pub const ROOT_SENTINEL: &str = "-1";

/// Load a skeleton from a joint-list file.
///
/// # Example
///
/// ```no_run
/// use armature::skeleton::load_skeleton;
///
/// let skeleton = load_skeleton("skeleton.out").unwrap();
/// println!("{} joints", skeleton.num_joints());
/// ```
pub fn load_skeleton<P: AsRef<Path>>(path: P) -> SkeletonResult<Skeleton> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_skeleton(&text)
}

/// Parse a skeleton from joint-list text.
///
/// # Example
///
/// ```
/// use armature::skeleton::parse_skeleton;
///
/// let text = "hips 0 0 0 -1\nknee 0 -1 0 hips\nfoot 0 -2 0 knee\n";
/// let skeleton = parse_skeleton(text).unwrap();
/// assert_eq!(skeleton.num_joints(), 3);
/// assert_eq!(skeleton.num_compressed(), 2);
/// ```
pub fn parse_skeleton(text: &str) -> SkeletonResult<Skeleton> {
    let mut builder = SkeletonBuilder::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 5 {
            debug!(line = line_no, fields = fields.len(), "skipping short joint line");
            continue;
        }

        let mut coords = [0.0; 3];
        for (c, field) in coords.iter_mut().zip(&fields[1..4]) {
            *c = field.parse().map_err(|_| SkeletonError::Parse {
                line: line_no,
                message: format!("invalid coordinate '{}'", field),
            })?;
        }

        let parent = match fields[4] {
            ROOT_SENTINEL => None,
            name => Some(name),
        };
        builder
            .make_joint(fields[0], Point3::from(coords), parent)
            .map_err(|e| SkeletonError::Parse {
                line: line_no,
                message: e.to_string(),
            })?;
    }

    Ok(builder.init_compressed()?.finish())
}
