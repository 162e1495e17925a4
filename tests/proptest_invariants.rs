//! Property-based tests for mesh topology and skeleton invariants.
//!
//! These tests use proptest to generate random inputs and verify invariants.
//!
//! Run with: cargo test --test proptest_invariants

use armature::prelude::*;
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A triangulated grid with `w x h` cells and jittered heights.
fn arb_grid() -> impl Strategy<Value = (Vec<Point3<f64>>, Vec<[usize; 3]>)> {
    (1usize..8, 1usize..8).prop_flat_map(|(w, h)| {
        prop::collection::vec(-1.0..1.0f64, (w + 1) * (h + 1)).prop_map(move |heights| {
            let mut vertices = Vec::with_capacity(heights.len());
            for j in 0..=h {
                for i in 0..=w {
                    vertices.push(Point3::new(i as f64, j as f64, heights[j * (w + 1) + i]));
                }
            }
            let mut faces = Vec::with_capacity(w * h * 2);
            for j in 0..h {
                for i in 0..w {
                    let v00 = j * (w + 1) + i;
                    let v10 = v00 + 1;
                    let v01 = v00 + (w + 1);
                    let v11 = v01 + 1;
                    faces.push([v00, v10, v11]);
                    faces.push([v00, v11, v01]);
                }
            }
            (vertices, faces)
        })
    })
}

/// Random faces over a small vertex set; may be degenerate or non-manifold.
fn arb_soup() -> impl Strategy<Value = (Vec<Point3<f64>>, Vec<Vec<usize>>)> {
    (3usize..10).prop_flat_map(|n| {
        let vertices = prop::collection::vec(prop::array::uniform3(-10.0..10.0f64), n)
            .prop_map(|ps| ps.into_iter().map(Point3::from).collect::<Vec<_>>());
        // Indices may overshoot the vertex list.
        let faces = prop::collection::vec(prop::collection::vec(0..n + 2, 3..5), 1..12);
        (vertices, faces)
    })
}

/// A random joint tree: each joint's parent is any earlier joint.
fn arb_tree() -> impl Strategy<Value = Vec<(usize, [f64; 3])>> {
    (1usize..30).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                let parent = if i == 0 { Just(0).boxed() } else { (0..i).boxed() };
                (parent, prop::array::uniform3(-1.0..1.0f64))
            })
            .collect::<Vec<_>>()
    })
}

fn build_tree(joints: &[(usize, [f64; 3])]) -> Skeleton {
    let mut builder = SkeletonBuilder::new();
    for (i, &(parent, p)) in joints.iter().enumerate() {
        let parent_name = format!("j{}", parent);
        let parent = (i > 0).then_some(parent_name.as_str());
        builder
            .make_joint(&format!("j{}", i), Point3::from(p), parent)
            .unwrap();
    }
    builder.init_compressed().unwrap().finish()
}

// =============================================================================
// Mesh properties
// =============================================================================

proptest! {
    #[test]
    fn grid_topology_is_valid((vertices, faces) in arb_grid()) {
        let mesh: Mesh = Mesh::from_triangles(&vertices, &faces).unwrap();

        prop_assert!(mesh.integrity_check());
        prop_assert!(mesh.is_connected());
        prop_assert_eq!(mesh.num_edges(), faces.len() * 3);

        for he in mesh.halfedge_ids() {
            let twin = mesh.twin(he);
            if twin.is_valid() {
                prop_assert_eq!(mesh.twin(twin), he);
                prop_assert_eq!(mesh.head(he), mesh.tail(twin));
            }
        }
        for f in mesh.face_ids() {
            let [a, b, c] = mesh.face_triangle(f);
            prop_assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn duplicated_faces_do_not_change_topology((vertices, faces) in arb_grid()) {
        let clean: Mesh = Mesh::from_triangles(&vertices, &faces).unwrap();

        let mut doubled = faces.clone();
        doubled.extend(faces.iter().map(|&[a, b, c]| [b, c, a]));
        let mesh: Mesh = Mesh::from_triangles(&vertices, &doubled).unwrap();

        prop_assert_eq!(mesh.num_edges(), clean.num_edges());
        prop_assert_eq!(mesh.boundary_edge_count(), clean.boundary_edge_count());
    }

    #[test]
    fn normals_are_unit_or_zero((vertices, faces) in arb_grid()) {
        let mut mesh: Mesh = Mesh::from_triangles(&vertices, &faces).unwrap();
        mesh.compute_vertex_normals();

        for vertex in mesh.vertices() {
            let len = vertex.normal.norm();
            prop_assert!(len.is_finite());
            prop_assert!((len - 1.0).abs() < 1e-9 || len == 0.0);
        }
    }

    #[test]
    fn normalization_is_invertible((vertices, faces) in arb_grid()) {
        let mut mesh: Mesh = Mesh::from_triangles(&vertices, &faces).unwrap();
        mesh.normalize_bounding_box();

        let (min, max) = mesh.bounding_box().unwrap();
        prop_assert!(min.iter().all(|&c| c >= -1e-9));
        prop_assert!(max.iter().all(|&c| c <= 1.0 + 1e-9));
        for (p, vertex) in vertices.iter().zip(mesh.vertices()) {
            prop_assert!((mesh.to_original(&vertex.position) - p).norm() < 1e-9);
        }
    }

    #[test]
    fn random_soup_never_panics((vertices, faces) in arb_soup()) {
        // Rejection is fine; an accepted mesh must be valid.
        if let Ok(mesh) = Mesh::<u32>::from_polygons(&vertices, &faces) {
            prop_assert!(mesh.integrity_check());
            let _ = mesh.is_connected();
        }
    }
}

// =============================================================================
// Skeleton properties
// =============================================================================

proptest! {
    #[test]
    fn compression_keeps_non_chain_joints(joints in arb_tree()) {
        let s = build_tree(&joints);
        let g = s.f_graph();

        for joint in 0..s.num_joints() {
            let kept = s.fc_map()[joint].is_some();
            prop_assert_eq!(kept, joint == 0 || g.degree(joint) != 2);
        }
        for (c, &full) in s.cf_map().iter().enumerate() {
            prop_assert_eq!(s.fc_map()[full], Some(c));
        }
    }

    #[test]
    fn bone_fractions_sum_to_one(joints in arb_tree()) {
        let s = build_tree(&joints);

        for c in 1..s.num_compressed() {
            let stop = s.cf_map()[s.c_prev()[c].unwrap()];
            let mut cur = s.cf_map()[c];
            let mut sum = 0.0;
            let mut length = 0.0;
            while cur != stop {
                let parent = s.f_prev()[cur].unwrap();
                sum += s.fc_fraction()[cur].unwrap();
                length += s.f_graph().distance(cur, parent);
                cur = parent;
                prop_assert!(cur == stop || s.fc_map()[cur].is_none());
            }
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!((length - s.c_length()[c]).abs() < 1e-9);
        }
    }

    #[test]
    fn scale_round_trip(joints in arb_tree(), k in 0.1..10.0f64) {
        let original = build_tree(&joints);
        let mut s = original.clone();

        s.scale(k);
        prop_assert_eq!(s.fc_fraction(), original.fc_fraction());
        s.scale(1.0 / k);

        for (a, b) in s.f_graph().verts.iter().zip(&original.f_graph().verts) {
            prop_assert!((a - b).norm() < 1e-9);
        }
        for (a, b) in s.c_graph().verts.iter().zip(&original.c_graph().verts) {
            prop_assert!((a - b).norm() < 1e-9);
        }
        for (a, b) in s.c_length().iter().zip(original.c_length()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
        prop_assert_eq!(s.fc_fraction(), original.fc_fraction());
    }

    #[test]
    fn reconstruction_pins_compressed_joints(joints in arb_tree()) {
        let s = build_tree(&joints);
        let c_positions = s.c_graph().verts.clone();
        let full = s.reconstruct_full(&c_positions).unwrap();

        for (c, &f) in s.cf_map().iter().enumerate() {
            prop_assert_eq!(full[f], c_positions[c]);
        }
        for joint in 0..s.num_joints() {
            if s.fc_map()[joint].is_none() {
                prop_assert!(full[joint].iter().all(|c| c.is_finite()));
            }
        }
    }
}
