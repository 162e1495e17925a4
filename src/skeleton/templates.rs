//! Predefined skeleton templates.
//!
//! Templates are authored in a `[-1, 1]` box and scaled by [`TEMPLATE_SCALE`] on
//! declaration, so they line up with a mesh normalized into the unit cube.
//! Joint order matters: parents come first, and the order fixes every index.

use std::fmt;

use nalgebra::Point3;

use super::tree::{Skeleton, SkeletonBuilder};
use crate::error::SkeletonResult;

/// Scale applied to template coordinates on declaration.
pub const TEMPLATE_SCALE: f64 = 0.5;

/// The built-in skeleton templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Biped: spine, head, two arms, two legs.
    Human,
    /// Four-legged animal with neck and tail.
    Quad,
    /// Quadruped with an extra hind-leg heel joint.
    Horse,
    /// Quadruped body carrying a human torso, arms and head.
    Centaur,
}

impl Template {
    /// All templates, in declaration order.
    pub const ALL: [Template; 4] = [
        Template::Human,
        Template::Quad,
        Template::Horse,
        Template::Centaur,
    ];

    /// Lowercase template name.
    pub fn name(self) -> &'static str {
        match self {
            Template::Human => "human",
            Template::Quad => "quad",
            Template::Horse => "horse",
            Template::Centaur => "centaur",
        }
    }

    /// Build the skeleton for this template.
    pub fn build(self) -> SkeletonResult<Skeleton> {
        match self {
            Template::Human => human(),
            Template::Quad => quad(),
            Template::Horse => horse(),
            Template::Centaur => centaur(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type JointSpec = (&'static str, [f64; 3], Option<&'static str>);

/// Declare joints and mirror pairs, compress, then apply foot and fat tags.
fn assemble(
    joints: &[JointSpec],
    symmetric: &[(&str, &str)],
    feet: &[&str],
    fat: &[&str],
) -> SkeletonResult<Skeleton> {
    let mut builder = SkeletonBuilder::new();
    for &(name, [x, y, z], parent) in joints {
        builder.make_joint(name, Point3::new(x, y, z) * TEMPLATE_SCALE, parent)?;
    }
    for &(a, b) in symmetric {
        builder.make_symmetric(a, b)?;
    }

    let mut compressed = builder.init_compressed()?;
    for name in feet {
        compressed.set_foot(name)?;
    }
    for name in fat {
        compressed.set_fat(name)?;
    }
    Ok(compressed.finish())
}

/// The human template: 18 joints, 7 after compression.
pub fn human() -> SkeletonResult<Skeleton> {
    assemble(
        &[
            ("shoulders", [0.0, 0.5, 0.0], None),
            ("back", [0.0, 0.15, 0.0], Some("shoulders")),
            ("hips", [0.0, 0.0, 0.0], Some("back")),
            ("head", [0.0, 0.7, 0.0], Some("shoulders")),
            ("lthigh", [-0.1, 0.0, 0.0], Some("hips")),
            ("lknee", [-0.15, -0.35, 0.0], Some("lthigh")),
            ("lankle", [-0.15, -0.8, 0.0], Some("lknee")),
            ("lfoot", [-0.15, -0.8, 0.1], Some("lankle")),
            ("rthigh", [0.1, 0.0, 0.0], Some("hips")),
            ("rknee", [0.15, -0.35, 0.0], Some("rthigh")),
            ("rankle", [0.15, -0.8, 0.0], Some("rknee")),
            ("rfoot", [0.15, -0.8, 0.1], Some("rankle")),
            ("lshoulder", [-0.2, 0.5, 0.0], Some("shoulders")),
            ("lelbow", [-0.4, 0.25, 0.075], Some("lshoulder")),
            ("lhand", [-0.6, 0.0, 0.15], Some("lelbow")),
            ("rshoulder", [0.2, 0.5, 0.0], Some("shoulders")),
            ("relbow", [0.4, 0.25, 0.075], Some("rshoulder")),
            ("rhand", [0.6, 0.0, 0.15], Some("relbow")),
        ],
        &[
            ("lthigh", "rthigh"),
            ("lknee", "rknee"),
            ("lankle", "rankle"),
            ("lfoot", "rfoot"),
            ("lshoulder", "rshoulder"),
            ("lelbow", "relbow"),
            ("lhand", "rhand"),
        ],
        &["lfoot", "rfoot"],
        &["hips", "shoulders", "head"],
    )
}

/// The quadruped template: body along z, legs down y, tail behind the hips.
pub fn quad() -> SkeletonResult<Skeleton> {
    assemble(
        &[
            ("shoulders", [0.0, 0.0, 0.5], None),
            ("back", [0.0, 0.0, 0.0], Some("shoulders")),
            ("hips", [0.0, 0.0, -0.5], Some("back")),
            ("neck", [0.0, 0.2, 0.63], Some("shoulders")),
            ("head", [0.0, 0.2, 0.9], Some("neck")),
            ("lthigh", [-0.15, 0.0, -0.5], Some("hips")),
            ("lhknee", [-0.2, -0.4, -0.5], Some("lthigh")),
            ("lhfoot", [-0.2, -0.8, -0.5], Some("lhknee")),
            ("rthigh", [0.15, 0.0, -0.5], Some("hips")),
            ("rhknee", [0.2, -0.4, -0.5], Some("rthigh")),
            ("rhfoot", [0.2, -0.8, -0.5], Some("rhknee")),
            ("lshoulder", [-0.2, 0.0, 0.5], Some("shoulders")),
            ("lfknee", [-0.2, -0.4, 0.5], Some("lshoulder")),
            ("lffoot", [-0.2, -0.8, 0.5], Some("lfknee")),
            ("rshoulder", [0.2, 0.0, 0.5], Some("shoulders")),
            ("rfknee", [0.2, -0.4, 0.5], Some("rshoulder")),
            ("rffoot", [0.2, -0.8, 0.5], Some("rfknee")),
            ("tail", [0.0, 0.0, -0.7], Some("hips")),
        ],
        &[
            ("lthigh", "rthigh"),
            ("lhknee", "rhknee"),
            ("lhfoot", "rhfoot"),
            ("lshoulder", "rshoulder"),
            ("lfknee", "rfknee"),
            ("lffoot", "rffoot"),
        ],
        &["lhfoot", "rhfoot", "lffoot", "rffoot"],
        &["hips", "shoulders", "head"],
    )
}

/// The horse template: a quadruped whose hind legs bend twice.
pub fn horse() -> SkeletonResult<Skeleton> {
    assemble(
        &[
            ("shoulders", [0.0, 0.0, 0.5], None),
            ("back", [0.0, 0.0, 0.0], Some("shoulders")),
            ("hips", [0.0, 0.0, -0.5], Some("back")),
            ("neck", [0.0, 0.2, 0.63], Some("shoulders")),
            ("head", [0.0, 0.2, 0.9], Some("neck")),
            ("lthigh", [-0.15, 0.0, -0.5], Some("hips")),
            ("lhknee", [-0.2, -0.2, -0.45], Some("lthigh")),
            ("lhheel", [-0.2, -0.4, -0.5], Some("lhknee")),
            ("lhfoot", [-0.2, -0.8, -0.5], Some("lhheel")),
            ("rthigh", [0.15, 0.0, -0.5], Some("hips")),
            ("rhknee", [0.2, -0.2, -0.45], Some("rthigh")),
            ("rhheel", [0.2, -0.4, -0.5], Some("rhknee")),
            ("rhfoot", [0.2, -0.8, -0.5], Some("rhheel")),
            ("lshoulder", [-0.2, 0.0, 0.5], Some("shoulders")),
            ("lfknee", [-0.2, -0.4, 0.5], Some("lshoulder")),
            ("lffoot", [-0.2, -0.8, 0.5], Some("lfknee")),
            ("rshoulder", [0.2, 0.0, 0.5], Some("shoulders")),
            ("rfknee", [0.2, -0.4, 0.5], Some("rshoulder")),
            ("rffoot", [0.2, -0.8, 0.5], Some("rfknee")),
            ("tail", [0.0, 0.0, -0.7], Some("hips")),
        ],
        &[
            ("lthigh", "rthigh"),
            ("lhknee", "rhknee"),
            ("lhheel", "rhheel"),
            ("lhfoot", "rhfoot"),
            ("lshoulder", "rshoulder"),
            ("lfknee", "rfknee"),
            ("lffoot", "rffoot"),
        ],
        &["lhfoot", "rhfoot", "lffoot", "rffoot"],
        &["hips", "shoulders", "head"],
    )
}

/// The centaur template: a second shoulder branch rises from the front of the body.
pub fn centaur() -> SkeletonResult<Skeleton> {
    assemble(
        &[
            ("shoulders", [0.0, 0.0, 0.5], None),
            ("back", [0.0, 0.0, 0.0], Some("shoulders")),
            ("hips", [0.0, 0.0, -0.5], Some("back")),
            ("hback", [0.0, 0.25, 0.5], Some("shoulders")),
            ("hshoulders", [0.0, 0.5, 0.5], Some("hback")),
            ("head", [0.0, 0.7, 0.5], Some("hshoulders")),
            ("lthigh", [-0.15, 0.0, -0.5], Some("hips")),
            ("lhknee", [-0.2, -0.4, -0.45], Some("lthigh")),
            ("lhfoot", [-0.2, -0.8, -0.5], Some("lhknee")),
            ("rthigh", [0.15, 0.0, -0.5], Some("hips")),
            ("rhknee", [0.2, -0.4, -0.45], Some("rthigh")),
            ("rhfoot", [0.2, -0.8, -0.5], Some("rhknee")),
            ("lshoulder", [-0.2, 0.0, 0.5], Some("shoulders")),
            ("lfknee", [-0.2, -0.4, 0.5], Some("lshoulder")),
            ("lffoot", [-0.2, -0.8, 0.5], Some("lfknee")),
            ("rshoulder", [0.2, 0.0, 0.5], Some("shoulders")),
            ("rfknee", [0.2, -0.4, 0.5], Some("rshoulder")),
            ("rffoot", [0.2, -0.8, 0.5], Some("rfknee")),
            ("hlshoulder", [-0.2, 0.5, 0.5], Some("hshoulders")),
            ("lelbow", [-0.4, 0.25, 0.575], Some("hlshoulder")),
            ("lhand", [-0.6, 0.0, 0.65], Some("lelbow")),
            ("hrshoulder", [0.2, 0.5, 0.5], Some("hshoulders")),
            ("relbow", [0.4, 0.25, 0.575], Some("hrshoulder")),
            ("rhand", [0.6, 0.0, 0.65], Some("relbow")),
            ("tail", [0.0, 0.0, -0.7], Some("hips")),
        ],
        &[
            ("lthigh", "rthigh"),
            ("lhknee", "rhknee"),
            ("lhfoot", "rhfoot"),
            ("lshoulder", "rshoulder"),
            ("lfknee", "rfknee"),
            ("lffoot", "rffoot"),
            ("hlshoulder", "hrshoulder"),
            ("lelbow", "relbow"),
            ("lhand", "rhand"),
        ],
        &["lhfoot", "rhfoot", "lffoot", "rffoot"],
        &["hips", "shoulders", "hshoulders", "head"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree_histogram(s: &Skeleton) -> (usize, usize, usize) {
        let g = s.f_graph();
        let mut counts = (0, 0, 0);
        for v in 0..g.num_vertices() {
            match g.degree(v) {
                1 => counts.0 += 1,
                2 => counts.1 += 1,
                _ => counts.2 += 1,
            }
        }
        counts
    }

    fn assert_fractions_sum_to_one(s: &Skeleton) {
        for c in 1..s.num_compressed() {
            let stop = s.cf_map()[s.c_prev()[c].unwrap()];
            let mut cur = s.cf_map()[c];
            let mut sum = 0.0;
            while cur != stop {
                sum += s.fc_fraction()[cur].unwrap();
                cur = s.f_prev()[cur].unwrap();
                if cur != stop {
                    assert_eq!(s.fc_map()[cur], None, "walk crossed a compressed joint");
                }
            }
            assert!((sum - 1.0).abs() < 1e-9, "bone {} sums to {}", c, sum);
        }
    }

    #[test]
    fn test_human_compression() {
        let s = human().unwrap();
        assert_eq!(s.num_joints(), 18);

        let (leaves, chains, branches) = degree_histogram(&s);
        assert_eq!(leaves + chains + branches, 18);
        assert_eq!(s.num_compressed(), 18 - chains);
        assert_eq!(s.num_compressed(), 7);
        assert_fractions_sum_to_one(&s);

        let names: Vec<_> = s
            .cf_map()
            .iter()
            .map(|&f| s.joint_name(f).unwrap())
            .collect();
        assert_eq!(names, ["shoulders", "hips", "head", "lfoot", "rfoot", "lhand", "rhand"]);
    }

    #[test]
    fn test_human_tags_and_symmetry() {
        let s = human().unwrap();

        let lfoot = s.fc_map()[s.joint_for_name("lfoot").unwrap()].unwrap();
        let rfoot = s.fc_map()[s.joint_for_name("rfoot").unwrap()].unwrap();
        assert!(s.c_feet()[lfoot] && s.c_feet()[rfoot]);
        assert_eq!(s.c_feet().iter().filter(|&&f| f).count(), 2);
        assert_eq!(s.c_sym()[rfoot], Some(lfoot));

        for name in ["hips", "shoulders", "head"] {
            let c = s.fc_map()[s.joint_for_name(name).unwrap()].unwrap();
            assert!(s.c_fat()[c], "{} should be fat", name);
        }

        let lknee = s.joint_for_name("lknee").unwrap();
        let rknee = s.joint_for_name("rknee").unwrap();
        assert_eq!(s.f_sym()[rknee], Some(lknee));
        assert_eq!(s.f_sym()[lknee], None);
    }

    #[test]
    fn test_template_positions_are_halved() {
        let s = human().unwrap();
        let head = s.joint_for_name("head").unwrap();
        assert_eq!(s.f_graph().verts[head], Point3::new(0.0, 0.35, 0.0));
    }

    #[test]
    fn test_all_templates_build() {
        let expected = [
            (Template::Human, 7, 2),
            (Template::Quad, 8, 4),
            (Template::Horse, 8, 4),
            (Template::Centaur, 11, 4),
        ];
        for (template, compressed, feet) in expected {
            let s = template.build().unwrap();
            assert_eq!(s.num_compressed(), compressed, "{}", template);
            assert_eq!(s.c_feet().iter().filter(|&&f| f).count(), feet, "{}", template);
            assert_fractions_sum_to_one(&s);
        }
        assert_eq!(Template::ALL.len(), 4);
        assert_eq!(Template::Centaur.to_string(), "centaur");
    }
}
