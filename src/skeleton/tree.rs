//! Full and compressed skeleton graphs.
//!
//! A skeleton is declared joint by joint on a [`SkeletonBuilder`], compressed
//! once with [`SkeletonBuilder::init_compressed`], tagged on the resulting
//! [`CompressedSkeleton`], and finally frozen into a [`Skeleton`]. Each step
//! consumes the previous stage, so builder calls after compression do not
//! compile.
//!
//! The compressed tree keeps the root, every leaf, and every branch point of the
//! full tree. Chain joints (exactly two neighbors) are elided; their positions
//! can be recovered from a compressed embedding with
//! [`Skeleton::reconstruct_full`] using the per-edge length fractions.

use std::collections::HashMap;

use nalgebra::Point3;
use tracing::{debug, warn};

use super::graph::PtGraph;
use crate::error::{SkeletonError, SkeletonResult};

/// Declares the joints of a full skeleton tree.
///
/// Parents must be declared before their children; the first joint is the root.
#[derive(Debug, Clone, Default)]
pub struct SkeletonBuilder {
    f_graph: PtGraph,
    f_prev: Vec<Option<usize>>,
    f_sym: Vec<Option<usize>>,
    joint_names: HashMap<String, usize>,
    names: Vec<String>,
}

impl SkeletonBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of joints declared so far.
    pub fn num_joints(&self) -> usize {
        self.f_prev.len()
    }

    /// Append a joint to the full tree.
    ///
    /// `parent` is `None` only for the root, which must be the first joint.
    pub fn make_joint(
        &mut self,
        name: &str,
        position: Point3<f64>,
        parent: Option<&str>,
    ) -> SkeletonResult<usize> {
        if self.joint_names.contains_key(name) {
            return Err(SkeletonError::DuplicateJoint(name.to_string()));
        }

        let prev = match parent {
            None if self.names.is_empty() => None,
            None => {
                return Err(SkeletonError::RootAlreadyDeclared {
                    name: name.to_string(),
                    root: self.names[0].clone(),
                })
            }
            Some(parent) => Some(self.lookup(parent)?),
        };

        let cur = self.f_graph.add_vertex(position);
        if let Some(prev) = prev {
            self.f_graph.add_edge(cur, prev);
        }
        self.f_prev.push(prev);
        self.f_sym.push(None);
        self.joint_names.insert(name.to_string(), cur);
        self.names.push(name.to_string());

        Ok(cur)
    }

    /// Mark two declared joints as mirror images.
    ///
    /// The relation is stored on the higher index, pointing at the lower one,
    /// whatever the argument order.
    pub fn make_symmetric(&mut self, first: &str, second: &str) -> SkeletonResult<()> {
        let a = self.lookup(first)?;
        let b = self.lookup(second)?;
        if a == b {
            return Err(SkeletonError::SelfSymmetric(first.to_string()));
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.f_sym[hi] = Some(lo);
        Ok(())
    }

    fn lookup(&self, name: &str) -> SkeletonResult<usize> {
        self.joint_names
            .get(name)
            .copied()
            .ok_or_else(|| SkeletonError::UnknownJoint(name.to_string()))
    }

    /// Derive the compressed tree, ending the declaration phase.
    pub fn init_compressed(self) -> SkeletonResult<CompressedSkeleton> {
        let n = self.f_prev.len();
        if n == 0 {
            return Err(SkeletonError::EmptySkeleton);
        }

        // Selection: keep the root and every joint whose degree is not 2.
        let mut fc_map = vec![None; n];
        let mut cf_map = Vec::new();
        for i in 0..n {
            if i > 0 && self.f_graph.degree(i) == 2 {
                continue;
            }
            fc_map[i] = Some(cf_map.len());
            cf_map.push(i);
        }
        let cn = cf_map.len();

        // Parents: climb from each kept joint to the nearest kept ancestor.
        let mut c_prev = vec![None; cn];
        let mut c_graph = PtGraph::new();
        for (i, &full) in cf_map.iter().enumerate() {
            c_graph.add_vertex(self.f_graph.verts[full]);
            if i > 0 {
                let ancestor = compressed_ancestor(&self.f_prev, &fc_map, full);
                c_prev[i] = fc_map[ancestor];
            }
        }
        for (i, prev) in c_prev.iter().enumerate() {
            if let Some(p) = *prev {
                c_graph.add_edge(i, p);
            }
        }

        let c_sym = self.compressed_symmetry(&fc_map, &cf_map);

        // Lengths and fractions: every full edge lies on exactly one bone.
        let mut c_length = vec![0.0; cn];
        let mut fc_fraction = vec![None; n];
        let mut chain: Vec<(usize, f64)> = Vec::new();
        for i in 1..cn {
            chain.clear();
            let mut cur = cf_map[i];
            while let Some(prev) = self.f_prev[cur] {
                chain.push((cur, self.f_graph.distance(cur, prev)));
                cur = prev;
                if fc_map[cur].is_some() {
                    break;
                }
            }

            let total: f64 = chain.iter().map(|&(_, len)| len).sum();
            c_length[i] = total;
            if total > f64::EPSILON {
                for &(joint, len) in &chain {
                    fc_fraction[joint] = Some(len / total);
                }
            } else {
                // Zero-length bone: split evenly so fractions still sum to one.
                let share = 1.0 / chain.len() as f64;
                for &(joint, _) in &chain {
                    fc_fraction[joint] = Some(share);
                }
            }
        }

        debug!(full = n, compressed = cn, "compressed skeleton");

        Ok(CompressedSkeleton {
            skeleton: Skeleton {
                f_graph: self.f_graph,
                f_prev: self.f_prev,
                f_sym: self.f_sym,
                c_graph,
                c_prev,
                c_sym,
                c_feet: vec![false; cn],
                c_fat: vec![false; cn],
                cf_map,
                fc_map,
                fc_fraction,
                c_length,
                joint_names: self.joint_names,
                names: self.names,
            },
        })
    }

    /// Map symmetry into compressed indices.
    ///
    /// A pair where only one joint survives compression loses its relation.
    fn compressed_symmetry(
        &self,
        fc_map: &[Option<usize>],
        cf_map: &[usize],
    ) -> Vec<Option<usize>> {
        for (joint, sym) in self.f_sym.iter().enumerate() {
            if let Some(partner) = *sym {
                if fc_map[joint].is_some() != fc_map[partner].is_some() {
                    warn!(
                        joint = %self.names[joint],
                        partner = %self.names[partner],
                        "symmetric joints compress differently, dropping symmetry"
                    );
                }
            }
        }

        cf_map
            .iter()
            .map(|&full| self.f_sym[full].and_then(|partner| fc_map[partner]))
            .collect()
    }
}

/// Walk up from `full` to the first ancestor kept in the compressed tree.
///
/// The root is always kept, so the walk terminates there at the latest.
fn compressed_ancestor(
    f_prev: &[Option<usize>],
    fc_map: &[Option<usize>],
    full: usize,
) -> usize {
    let mut cur = full;
    while let Some(prev) = f_prev[cur] {
        cur = prev;
        if fc_map[cur].is_some() {
            break;
        }
    }
    cur
}

/// A compressed skeleton that still accepts foot and fat tags.
#[derive(Debug, Clone)]
pub struct CompressedSkeleton {
    skeleton: Skeleton,
}

impl CompressedSkeleton {
    /// Mark a joint as one that should rest near the ground.
    pub fn set_foot(&mut self, name: &str) -> SkeletonResult<()> {
        let c = self.compressed_index(name)?;
        self.skeleton.c_feet[c] = true;
        Ok(())
    }

    /// Mark a joint as anchoring a large fleshy region.
    pub fn set_fat(&mut self, name: &str) -> SkeletonResult<()> {
        let c = self.compressed_index(name)?;
        self.skeleton.c_fat[c] = true;
        Ok(())
    }

    fn compressed_index(&self, name: &str) -> SkeletonResult<usize> {
        let full = self
            .skeleton
            .joint_for_name(name)
            .ok_or_else(|| SkeletonError::UnknownJoint(name.to_string()))?;
        self.skeleton.fc_map[full].ok_or_else(|| SkeletonError::ElidedJoint(name.to_string()))
    }

    /// Read access to the skeleton before tagging is finished.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Freeze the skeleton.
    pub fn finish(self) -> Skeleton {
        self.skeleton
    }
}

/// A finished skeleton with its full and compressed representations.
///
/// Indices into the full tree are joint indices in declaration order; indices
/// into the compressed tree are assigned in the same order among kept joints.
#[derive(Debug, Clone)]
pub struct Skeleton {
    f_graph: PtGraph,
    f_prev: Vec<Option<usize>>,
    f_sym: Vec<Option<usize>>,

    c_graph: PtGraph,
    c_prev: Vec<Option<usize>>,
    c_sym: Vec<Option<usize>>,
    c_feet: Vec<bool>,
    c_fat: Vec<bool>,

    cf_map: Vec<usize>,
    fc_map: Vec<Option<usize>>,
    fc_fraction: Vec<Option<f64>>,
    c_length: Vec<f64>,

    joint_names: HashMap<String, usize>,
    names: Vec<String>,
}

impl Skeleton {
    /// The full joint tree.
    pub fn f_graph(&self) -> &PtGraph {
        &self.f_graph
    }

    /// Parent of each full joint, `None` for the root.
    pub fn f_prev(&self) -> &[Option<usize>] {
        &self.f_prev
    }

    /// Mirror partner of each full joint, stored on the higher index.
    pub fn f_sym(&self) -> &[Option<usize>] {
        &self.f_sym
    }

    /// The compressed joint tree.
    pub fn c_graph(&self) -> &PtGraph {
        &self.c_graph
    }

    /// Parent of each compressed joint, `None` for the root.
    pub fn c_prev(&self) -> &[Option<usize>] {
        &self.c_prev
    }

    /// Mirror partner of each compressed joint.
    pub fn c_sym(&self) -> &[Option<usize>] {
        &self.c_sym
    }

    /// Whether each compressed joint should rest near the ground.
    pub fn c_feet(&self) -> &[bool] {
        &self.c_feet
    }

    /// Whether each compressed joint anchors a large region.
    pub fn c_fat(&self) -> &[bool] {
        &self.c_fat
    }

    /// Compressed index to full index.
    pub fn cf_map(&self) -> &[usize] {
        &self.cf_map
    }

    /// Full index to compressed index, `None` for elided joints.
    pub fn fc_map(&self) -> &[Option<usize>] {
        &self.fc_map
    }

    /// Share of its bone's length taken by each full joint's incoming edge.
    pub fn fc_fraction(&self) -> &[Option<f64>] {
        &self.fc_fraction
    }

    /// Length of the bone ending at each compressed joint (zero for the root).
    pub fn c_length(&self) -> &[f64] {
        &self.c_length
    }

    /// Number of full joints.
    pub fn num_joints(&self) -> usize {
        self.f_prev.len()
    }

    /// Number of compressed joints.
    pub fn num_compressed(&self) -> usize {
        self.cf_map.len()
    }

    /// Full index of a named joint.
    pub fn joint_for_name(&self, name: &str) -> Option<usize> {
        self.joint_names.get(name).copied()
    }

    /// Name of a full joint.
    pub fn joint_name(&self, joint: usize) -> Option<&str> {
        self.names.get(joint).map(String::as_str)
    }

    /// Uniformly scale all joint positions and bone lengths.
    ///
    /// Fractions are ratios and stay unchanged.
    pub fn scale(&mut self, factor: f64) {
        self.f_graph.scale(factor);
        self.c_graph.scale(factor);
        for length in &mut self.c_length {
            *length *= factor;
        }
    }

    /// Recover every full joint position from compressed joint positions.
    ///
    /// Kept joints take their compressed position; chain joints are placed
    /// along their bone so that each full edge spans its fraction of the bone.
    pub fn reconstruct_full(
        &self,
        c_positions: &[Point3<f64>],
    ) -> SkeletonResult<Vec<Point3<f64>>> {
        if c_positions.len() != self.cf_map.len() {
            return Err(SkeletonError::EmbeddingSize {
                expected: self.cf_map.len(),
                actual: c_positions.len(),
            });
        }

        let mut full: Vec<Point3<f64>> = vec![Point3::origin(); self.f_prev.len()];
        for (c, &f) in self.cf_map.iter().enumerate() {
            full[f] = c_positions[c];
        }

        for (c, prev) in self.c_prev.iter().enumerate() {
            let Some(prev) = *prev else {
                continue;
            };
            let bone = c_positions[prev] - c_positions[c];
            let mut cur = self.cf_map[c];
            let mut pos = c_positions[c];
            while let Some(parent) = self.f_prev[cur] {
                if self.fc_map[parent].is_some() {
                    break;
                }
                pos += bone * self.fc_fraction[cur].unwrap_or(0.0);
                full[parent] = pos;
                cur = parent;
            }
        }

        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Skeleton {
        let mut b = SkeletonBuilder::new();
        b.make_joint("root", Point3::new(0.0, 0.0, 0.0), None).unwrap();
        b.make_joint("mid", Point3::new(0.0, -1.0, 0.0), Some("root")).unwrap();
        b.make_joint("tip", Point3::new(0.0, -2.0, 0.0), Some("mid")).unwrap();
        b.init_compressed().unwrap().finish()
    }

    #[test]
    fn test_chain_compression() {
        let s = chain();

        assert_eq!(s.num_compressed(), 2);
        assert_eq!(s.cf_map(), &[0, 2]);
        assert_eq!(s.fc_map(), &[Some(0), None, Some(1)]);
        assert_eq!(s.c_prev(), &[None, Some(0)]);
        assert!((s.c_length()[1] - 2.0).abs() < 1e-12);

        let mid = s.joint_for_name("mid").unwrap();
        let tip = s.joint_for_name("tip").unwrap();
        assert!((s.fc_fraction()[mid].unwrap() - 0.5).abs() < 1e-12);
        assert!((s.fc_fraction()[tip].unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(s.fc_fraction()[0], None);
    }

    #[test]
    fn test_make_joint_preconditions() {
        let mut b = SkeletonBuilder::new();
        assert!(matches!(
            b.make_joint("a", Point3::origin(), Some("missing")),
            Err(SkeletonError::UnknownJoint(_))
        ));
        b.make_joint("root", Point3::origin(), None).unwrap();
        assert!(matches!(
            b.make_joint("root", Point3::origin(), None),
            Err(SkeletonError::DuplicateJoint(_))
        ));
        assert!(matches!(
            b.make_joint("other", Point3::origin(), None),
            Err(SkeletonError::RootAlreadyDeclared { .. })
        ));
        assert_eq!(b.num_joints(), 1);
    }

    #[test]
    fn test_symmetry_stored_on_higher_index() {
        let mut b = SkeletonBuilder::new();
        b.make_joint("hips", Point3::origin(), None).unwrap();
        b.make_joint("l", Point3::new(-1.0, 0.0, 0.0), Some("hips")).unwrap();
        b.make_joint("r", Point3::new(1.0, 0.0, 0.0), Some("hips")).unwrap();
        b.make_joint("tail", Point3::new(0.0, 0.0, -1.0), Some("hips")).unwrap();
        b.make_symmetric("r", "l").unwrap();
        assert!(matches!(b.make_symmetric("l", "l"), Err(SkeletonError::SelfSymmetric(_))));
        assert!(matches!(b.make_symmetric("l", "x"), Err(SkeletonError::UnknownJoint(_))));

        let s = b.init_compressed().unwrap().finish();
        assert_eq!(s.f_sym(), &[None, None, Some(1), None]);
        assert_eq!(s.c_sym(), &[None, None, Some(1), None]);
    }

    #[test]
    fn test_unbalanced_symmetry_is_dropped() {
        let mut b = SkeletonBuilder::new();
        b.make_joint("root", Point3::origin(), None).unwrap();
        b.make_joint("a", Point3::new(-1.0, 0.0, 0.0), Some("root")).unwrap();
        b.make_joint("b", Point3::new(1.0, 0.0, 0.0), Some("root")).unwrap();
        b.make_joint("b2", Point3::new(2.0, 0.0, 0.0), Some("b")).unwrap();
        b.make_symmetric("a", "b").unwrap();

        let s = b.init_compressed().unwrap().finish();
        // "b" is a chain joint, "a" is a leaf.
        assert_eq!(s.fc_map()[2], None);
        assert!(s.c_sym().iter().all(Option::is_none));
    }

    #[test]
    fn test_branching_root_is_kept() {
        let mut b = SkeletonBuilder::new();
        b.make_joint("root", Point3::origin(), None).unwrap();
        b.make_joint("up", Point3::new(0.0, 1.0, 0.0), Some("root")).unwrap();
        b.make_joint("down", Point3::new(0.0, -1.0, 0.0), Some("root")).unwrap();

        let s = b.init_compressed().unwrap().finish();
        assert_eq!(s.cf_map(), &[0, 1, 2]);
        assert_eq!(s.c_prev(), &[None, Some(0), Some(0)]);
        assert_eq!(s.c_graph().degree(0), 2);
    }

    #[test]
    fn test_zero_length_bone_splits_evenly() {
        let mut b = SkeletonBuilder::new();
        b.make_joint("root", Point3::origin(), None).unwrap();
        b.make_joint("mid", Point3::origin(), Some("root")).unwrap();
        b.make_joint("tip", Point3::origin(), Some("mid")).unwrap();

        let s = b.init_compressed().unwrap().finish();
        assert_eq!(s.c_length()[1], 0.0);
        assert_eq!(s.fc_fraction()[1], Some(0.5));
        assert_eq!(s.fc_fraction()[2], Some(0.5));
    }

    #[test]
    fn test_tags_require_compressed_joint() {
        let mut b = SkeletonBuilder::new();
        b.make_joint("root", Point3::origin(), None).unwrap();
        b.make_joint("mid", Point3::new(0.0, -1.0, 0.0), Some("root")).unwrap();
        b.make_joint("tip", Point3::new(0.0, -2.0, 0.0), Some("mid")).unwrap();
        let mut c = b.init_compressed().unwrap();

        c.set_foot("tip").unwrap();
        c.set_fat("root").unwrap();
        assert!(matches!(c.set_foot("mid"), Err(SkeletonError::ElidedJoint(_))));
        assert!(matches!(c.set_fat("nope"), Err(SkeletonError::UnknownJoint(_))));

        let s = c.finish();
        assert_eq!(s.c_feet(), &[false, true]);
        assert_eq!(s.c_fat(), &[true, false]);
    }

    #[test]
    fn test_empty_builder_fails() {
        assert!(matches!(
            SkeletonBuilder::new().init_compressed(),
            Err(SkeletonError::EmptySkeleton)
        ));
    }

    #[test]
    fn test_scale_copies_are_independent() {
        let original = chain();
        let mut scaled = original.clone();
        scaled.scale(3.0);

        assert!((scaled.c_length()[1] - 6.0).abs() < 1e-12);
        assert!((original.c_length()[1] - 2.0).abs() < 1e-12);
        assert_eq!(scaled.fc_fraction(), original.fc_fraction());
        assert_eq!(scaled.f_graph().verts[2], Point3::new(0.0, -6.0, 0.0));
        assert_eq!(scaled.c_graph().verts[1], Point3::new(0.0, -6.0, 0.0));
    }

    #[test]
    fn test_reconstruct_full_along_bone() {
        let s = chain();
        let full = s
            .reconstruct_full(&[Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 5.0)])
            .unwrap();
        assert_eq!(full.len(), 3);
        assert!((full[1] - Point3::new(1.0, 1.0, 3.0)).norm() < 1e-12);

        assert!(matches!(
            s.reconstruct_full(&[Point3::origin()]),
            Err(SkeletonError::EmbeddingSize { expected: 2, actual: 1 })
        ));
    }
}
